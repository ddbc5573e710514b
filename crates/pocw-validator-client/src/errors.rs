use thiserror::Error;

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("no votes were collected from any validator")]
    NoVotesCollected,

    #[error("aggregator forwarding failed: {0}")]
    AggregatorUnreachable(String),
}
