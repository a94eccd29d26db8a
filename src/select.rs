use std::io::Write;
use std::num::NonZeroUsize;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::acquisition::Rendition;
use crate::catalog::Catalog;
use crate::error::{Error, Result};

pub const PROMPT: &str = "\n> Quality: ";

/// How the rendition for this run gets picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRequest {
    /// 1-based position in the catalog.
    Index(NonZeroUsize),
    Best,
    Interactive,
}

impl SelectionRequest {
    /// An explicit index wins over `best`, `best` wins over prompting.
    pub fn from_args(quality: Option<usize>, best: bool) -> Self {
        match quality.and_then(NonZeroUsize::new) {
            Some(index) => SelectionRequest::Index(index),
            None if best => SelectionRequest::Best,
            None => SelectionRequest::Interactive,
        }
    }
}

/// Reduces the catalog to a single rendition. Only the interactive request
/// touches `input` and `out`.
pub async fn select<'a, R, W>(
    catalog: &'a Catalog,
    request: SelectionRequest,
    input: &mut R,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<&'a Rendition>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match request {
        SelectionRequest::Index(index) => catalog.get(index),
        SelectionRequest::Best => Ok(catalog.best()),
        SelectionRequest::Interactive => {
            let index = prompt(catalog, input, out, cancel).await?;
            catalog.get(index)
        }
    }
}

async fn prompt<R, W>(catalog: &Catalog, input: &mut R, out: &mut W, cancel: &CancellationToken) -> Result<NonZeroUsize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}{}", catalog.menu(), PROMPT)?;
    out.flush()?;

    let mut line = String::new();
    let read = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Interrupted),
        read = input.read_line(&mut line) => read?,
    };

    let answer = line.trim();
    if read == 0 {
        debug!("Input closed before a quality was entered");
        return Err(Error::InvalidSelection(String::new()));
    }

    answer
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::InvalidSelection(answer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Rendition::new("360", 360),
            Rendition::new("480", 480),
            Rendition::new("720", 720),
        ])
        .unwrap()
    }

    async fn run(request: SelectionRequest, stdin: &[u8]) -> (Result<Rendition>, String) {
        let catalog = catalog();
        let mut input = stdin;
        let mut out = Vec::new();
        let result = select(&catalog, request, &mut input, &mut out, &CancellationToken::new())
            .await
            .cloned();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn precedence_is_index_then_best_then_prompt() {
        let three = NonZeroUsize::new(3).unwrap();
        assert_eq!(SelectionRequest::from_args(Some(3), true), SelectionRequest::Index(three));
        assert_eq!(SelectionRequest::from_args(Some(3), false), SelectionRequest::Index(three));
        assert_eq!(SelectionRequest::from_args(None, true), SelectionRequest::Best);
        assert_eq!(SelectionRequest::from_args(None, false), SelectionRequest::Interactive);
    }

    #[test]
    fn zero_index_is_not_an_index() {
        assert_eq!(SelectionRequest::from_args(Some(0), true), SelectionRequest::Best);
        assert_eq!(SelectionRequest::from_args(Some(0), false), SelectionRequest::Interactive);
    }

    #[tokio::test]
    async fn explicit_index_selects_position_minus_one() {
        for (q, expected) in [(1, 360), (2, 480), (3, 720)] {
            let request = SelectionRequest::Index(NonZeroUsize::new(q).unwrap());
            let (result, out) = run(request, b"").await;
            assert_eq!(result.unwrap().resolution, expected);
            assert!(out.is_empty());
        }
    }

    #[tokio::test]
    async fn explicit_index_out_of_range_is_an_error() {
        let request = SelectionRequest::Index(NonZeroUsize::new(4).unwrap());
        let (result, _) = run(request, b"").await;
        assert!(matches!(result, Err(Error::RenditionNotFound { index: 4, available: 3 })));
    }

    #[tokio::test]
    async fn best_picks_the_last_rendition_without_prompting() {
        let (result, out) = run(SelectionRequest::Best, b"1\n").await;
        assert_eq!(result.unwrap().resolution, 720);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn prompt_lists_every_rendition_and_reads_one_line() {
        let (result, out) = run(SelectionRequest::Interactive, b"2\n").await;
        assert_eq!(result.unwrap().stream_id, "480");
        assert_eq!(out, "1) 360p   2) 480p   3) 720p\n> Quality: ");
    }

    #[tokio::test]
    async fn prompt_tolerates_surrounding_whitespace() {
        let (result, _) = run(SelectionRequest::Interactive, b"  3 \r\n").await;
        assert_eq!(result.unwrap().resolution, 720);
    }

    #[tokio::test]
    async fn prompt_rejects_garbage_zero_and_out_of_range() {
        let (result, _) = run(SelectionRequest::Interactive, b"best\n").await;
        assert!(matches!(result, Err(Error::InvalidSelection(ref s)) if s == "best"));

        let (result, _) = run(SelectionRequest::Interactive, b"0\n").await;
        assert!(matches!(result, Err(Error::InvalidSelection(ref s)) if s == "0"));

        let (result, _) = run(SelectionRequest::Interactive, b"7\n").await;
        assert!(matches!(result, Err(Error::RenditionNotFound { index: 7, available: 3 })));
    }

    #[tokio::test]
    async fn prompt_on_closed_input_is_an_error() {
        let (result, _) = run(SelectionRequest::Interactive, b"").await;
        assert!(matches!(result, Err(Error::InvalidSelection(ref s)) if s.is_empty()));
    }

    #[tokio::test]
    async fn cancellation_unblocks_the_prompt() {
        let catalog = catalog();
        let (_writer, reader) = tokio::io::duplex(64);
        let mut input = tokio::io::BufReader::new(reader);
        let mut out = Vec::new();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = select(&catalog, SelectionRequest::Interactive, &mut input, &mut out, &cancel).await;
        assert!(matches!(result, Err(Error::Interrupted)));
    }
}
