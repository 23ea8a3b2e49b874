//! Review sentiment via the completion endpoint

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::llm::{CompletionProvider, CompletionRequest};

/// Build the classification prompt listing every review
#[must_use]
pub fn sentiment_prompt(reviews: &[String]) -> String {
    let mut prompt = String::from(
        "Classify each review below as positive (+1), neutral (0) or negative (-1), \
         then output only the average of those values as a single number on the first line:\n",
    );
    for review in reviews {
        prompt.push_str("- ");
        prompt.push_str(review);
        prompt.push('\n');
    }
    prompt
}

/// First line of the reply as a finite number; anything else is neutral
#[must_use]
pub fn parse_sentiment(reply: &str) -> f64 {
    reply
        .trim()
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Scores a batch of reviews as one sentiment scalar
pub struct SentimentScorer {
    llm: Arc<dyn CompletionProvider>,
}

impl SentimentScorer {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    /// Average polarity of `reviews`; 0.0 when the reply is unusable or the call fails
    #[instrument(skip(self, reviews), fields(reviews = reviews.len()))]
    pub async fn score(&self, reviews: &[String]) -> f64 {
        if reviews.is_empty() {
            return 0.0;
        }
        let request = CompletionRequest::new(sentiment_prompt(reviews)).with_temperature(0.0);
        match self.llm.complete(request).await {
            Ok(reply) => {
                let score = parse_sentiment(&reply);
                debug!("Sentiment reply {:?} parsed as {}", reply.lines().next(), score);
                score
            }
            Err(e) => {
                warn!("Sentiment classification failed, using 0.0: {}", e);
                0.0
            }
        }
    }
}
