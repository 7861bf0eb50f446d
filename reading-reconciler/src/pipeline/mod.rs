use std::{pin::Pin, sync::Arc};

use futures::{Stream, StreamExt};

/// A record travelling through the pipeline, tagged with the line of the
/// input file it was read from (1-based, header included).
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub line: u64,
}

impl<T> Envelope<T> {
    pub fn new(payload: T, line: u64) -> Self {
        Self { payload, line }
    }

    /// Replaces the payload, keeping the source position.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            payload: f(self.payload),
            line: self.line,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

/// Consumes the whole stream and returns the number of records written.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<usize, PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

/// Source -> same-type transforms -> projection -> sink.
///
/// Items are pulled one at a time, so the sink sees records in source order.
pub struct Pipeline<S, I, O, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<I, I> + Send + Sync>>,
    pub projection: Arc<dyn Transform<I, O> + Send + Sync>,
    pub sink: K,
}

impl<S, I, O, K> Pipeline<S, I, O, K>
where
    I: Send + 'static,
    O: Send + 'static,
    S: Source<I> + Send + Sync + 'static,
    K: Sink<O> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<usize, PipelineError> {
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t = t.clone();
                async move {
                    match item {
                        Ok(env) => t.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        let projection = self.projection;
        let projected: EnvelopeStream<O> = Box::pin(stream.then(move |item| {
            let p = projection.clone();
            async move {
                match item {
                    Ok(env) => p.apply(env).await,
                    Err(e) => Err(e),
                }
            }
        }));

        self.sink.run(projected).await
    }
}
