//! Business framework analysis for ranked dishes
//!
//! Two modes: fixed templated SWOT/4P/PEST sections, or free-form prose
//! generated by the completion endpoint across the whole framework catalog.
//! Generated text is passed through as opaque markup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::llm::{CompletionProvider, CompletionRequest};
use crate::models::{DishCandidate, EconomicProfile, Timeframe};

pub mod frameworks;

pub use frameworks::{
    FRAMEWORK_CATALOG, FrameworkSection, SectionEntry, TEMPLATED_SECTIONS, templated_sections,
};

/// How analysis text is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Templated,
    Generated,
}

/// Analysis attached to one ranked dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DishAnalysis {
    Templated { sections: Vec<FrameworkSection> },
    Generated { markup: String },
    Unavailable { warning: String },
}

/// What the analyst knows about the dish being analyzed
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    pub dish: &'a DishCandidate,
    pub economy: &'a EconomicProfile,
    /// Canonical location, empty when the request named only a dish
    pub location: &'a str,
    pub timeframe: Timeframe,
}

fn generation_prompt(context: &AnalysisContext<'_>) -> String {
    let frameworks = FRAMEWORK_CATALOG
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {name}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let location = if context.location.is_empty() {
        "an unspecified city".to_string()
    } else {
        context.location.to_string()
    };

    format!(
        "You are a senior restaurant strategy consultant. Write a launch analysis for the dish \
         \"{dish}\" in {location}, for {timeframe}.\n\n\
         Known signals:\n\
         - composite score: {score}\n\
         - average review sentiment (-1 to 1): {sentiment:.2}\n\
         - search interest (0 to 100): {trend:.1}\n\
         - household income: {income}\n\
         - population: {population}\n\n\
         Apply each of the following frameworks in order. For every framework write a \
         heading with its name followed by three to five concise, concrete bullet points \
         specific to this dish and city. Do not invent statistics beyond the signals \
         above. Finish with a short recommendation paragraph.\n\n{frameworks}\n",
        dish = context.dish.name,
        timeframe = context.timeframe,
        score = context.dish.score,
        sentiment = context.dish.sentiment,
        trend = context.dish.trend,
        income = context.economy.income,
        population = context.economy.population,
    )
}

/// Produces framework analysis for dishes
pub struct Analyst {
    llm: Arc<dyn CompletionProvider>,
}

impl Analyst {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, context), fields(dish = %context.dish.name))]
    pub async fn analyze(&self, context: &AnalysisContext<'_>, mode: AnalysisMode) -> DishAnalysis {
        match mode {
            AnalysisMode::Templated => DishAnalysis::Templated {
                sections: templated_sections(context.dish, context.economy),
            },
            AnalysisMode::Generated => {
                let request = CompletionRequest::new(generation_prompt(context)).with_max_tokens(3000);
                match self.llm.complete(request).await {
                    Ok(markup) => DishAnalysis::Generated { markup },
                    Err(e) => {
                        warn!("Generated analysis failed: {}", e);
                        DishAnalysis::Unavailable {
                            warning: format!("Analysis could not be generated: {}", e.user_message()),
                        }
                    }
                }
            }
        }
    }
}
