/*!
 * Token-budgeted chunking of caption entries.
 *
 * Entries are grouped into consecutive chunks whose summed row cost stays
 * within the budget. A chunk is only closed when the next entry would push it
 * over the budget, so a single entry costlier than the whole budget still
 * becomes a chunk of its own; it is never dropped or split.
 */

use std::convert::Infallible;
use std::mem;

use log::debug;

use crate::app_config::ModelConfig;
use crate::subtitle_processor::SubtitleEntry;

use super::table::budget_row;
use super::tokens::TokenCounter;

/// A batch of contiguous entries sent together for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Entries in their original order
    pub entries: Vec<SubtitleEntry>,

    /// Summed row cost of the entries
    pub tokens: usize,
}

impl Chunk {
    /// Number of entries in the chunk
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chunk holds no entry; never true for emitted chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the entries out of the chunk
    pub fn into_entries(self) -> Vec<SubtitleEntry> {
        self.entries
    }
}

/// Groups entries into chunks under a token budget
#[derive(Debug, Clone, Copy)]
pub struct Chunker<'c> {
    counter: &'c dyn TokenCounter,
    budget: usize,
}

impl<'c> Chunker<'c> {
    /// Create a chunker with an explicit token budget
    pub fn new(counter: &'c dyn TokenCounter, budget: usize) -> Self {
        Self { counter, budget }
    }

    /// Create a chunker whose budget is a fraction of the model context
    pub fn for_model(counter: &'c dyn TokenCounter, model: &ModelConfig, ratio: f64) -> Self {
        Self::new(counter, model.token_budget(ratio))
    }

    /// Token budget of a chunk
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Cost of one entry in the budget
    pub fn entry_cost(&self, entry: &SubtitleEntry) -> usize {
        self.counter.count(&budget_row(&entry.text))
    }

    /// Lazily chunk a fallible entry stream.
    ///
    /// The first error is yielded as soon as it is pulled; the partially
    /// filled chunk is discarded and the stream ends.
    pub fn try_chunks<I, E>(&self, entries: I) -> TryChunks<'c, I::IntoIter>
    where
        I: IntoIterator<Item = Result<SubtitleEntry, E>>,
    {
        TryChunks {
            entries: entries.into_iter(),
            chunker: *self,
            pending: Vec::new(),
            pending_tokens: 0,
            finished: false,
        }
    }

    /// Lazily chunk an entry sequence
    pub fn chunks<I>(&self, entries: I) -> impl Iterator<Item = Chunk> + use<'c, I>
    where
        I: IntoIterator<Item = SubtitleEntry>,
    {
        self.try_chunks(entries.into_iter().map(Ok::<_, Infallible>))
            .map(|chunk| match chunk {
                Ok(chunk) => chunk,
                Err(never) => match never {},
            })
    }
}

/// Iterator returned by [`Chunker::try_chunks`]
pub struct TryChunks<'c, I> {
    entries: I,
    chunker: Chunker<'c>,
    pending: Vec<SubtitleEntry>,
    pending_tokens: usize,
    finished: bool,
}

impl<I> TryChunks<'_, I> {
    fn take_pending(&mut self) -> Chunk {
        let chunk = Chunk {
            entries: mem::take(&mut self.pending),
            tokens: mem::replace(&mut self.pending_tokens, 0),
        };

        if let (Some(first), Some(last)) = (chunk.entries.first(), chunk.entries.last()) {
            debug!(
                "Chunk ready: {} entries (#{}..#{}), {} of {} tokens",
                chunk.len(), first.seq_num, last.seq_num, chunk.tokens, self.chunker.budget()
            );
        }

        chunk
    }
}

impl<I, E> Iterator for TryChunks<'_, I>
where
    I: Iterator<Item = Result<SubtitleEntry, E>>,
{
    type Item = Result<Chunk, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.entries.next() {
                Some(Ok(entry)) => {
                    let cost = self.chunker.entry_cost(&entry);

                    if self.pending_tokens + cost > self.chunker.budget() && !self.pending.is_empty() {
                        let ready = self.take_pending();
                        self.pending.push(entry);
                        self.pending_tokens = cost;
                        return Some(Ok(ready));
                    }

                    self.pending.push(entry);
                    self.pending_tokens += cost;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    self.pending.clear();
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    if self.pending.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.take_pending()));
                }
            }
        }
    }
}
