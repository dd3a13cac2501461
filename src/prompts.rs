//! Embedded prompt templates for the nine agents.
//!
//! Templates are compiled into the binary and rendered through handlebars.
//! Before rendering, every placeholder an agent declares is resolved from
//! the task inputs; anything absent is substituted with the literal
//! [`NOT_AVAILABLE`] so a partially filled context never fails a render.
//! Strict mode stays on, so a template variable outside the declared
//! placeholder set is a hard error rather than a silent empty string.

use std::collections::BTreeMap;

use handlebars::{no_escape, Handlebars};

use crate::error::Error;
use crate::executor::TaskInputs;

/// Literal substituted for any declared placeholder with no matching input.
pub const NOT_AVAILABLE: &str = "Not available";

/// Daily itinerary generation.
pub const PLAN: &str = r#"You are an expert travel planner.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Generate a daily itinerary with time slots, place names, address, description,
weather, entry fees, and transport method clearly.
The output must be JSON only, no text explanations:
[
  {
    "day": 1,
    "date": "YYYY-MM-DD",
    "slots": [
      {
        "time": "09:00",
        "duration": "2 hours",
        "place": "Name",
        "address": "Address",
        "description": "Short description",
        "weather": "Sunny, 22C",
        "entry_fee": "$10",
        "transport_method": "Subway"
      }
    ]
  }
]
"#;

/// Detailed cost breakdown.
pub const BUDGET: &str = r#"You are a travel budget analyst.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Calculate a detailed budget split:
- Accommodation, Meals, Transport, Activities, Shopping costs
- Provide a total that stays within the user's stated budget.
- The budget entered by the user is in Indian Rupees (INR).
Return JSON:
{
  "Accommodation": "$300",
  "Meals": "$180",
  "Transport": "$120",
  "Activities": "$150",
  "Shopping": "$100",
  "Total": "$850"
}
"#;

/// Cost-cutting suggestions over the current budget.
pub const OPTIMIZE_BUDGET: &str = r#"You are a cost optimizer for travel.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Suggest changes that reduce costs in categories such as accommodation,
meals, transport, or activities while retaining experience quality.
Return a new optimized budget breakdown as JSON.
"#;

/// Alternate itinerary under changed conditions.
pub const REPLAN: &str = r#"You are a replanning agent.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Given new conditions such as weather changes, event conflicts, or user
feedback, generate a new daily itinerary with revised timings and places
where needed.
Return the same structured JSON as the daily itinerary.
"#;

/// Single place lookup.
pub const PLACE_DETAILS: &str = r#"You are a place detail provider.

Place lookup:
- Place: {{place_name}}
- Location: {{location}}
- Date: {{date}}

Return entry fee, address, weather, a short description, top highlights,
nearby restaurants, a map link, and available transport.
Return structured JSON.
"#;

/// Local information for the destination.
pub const CITY_GUIDE: &str = r#"You are a city guide.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Return:
- Visa information
- Local customs
- Public transport tips
- Local events during the travel period
Return structured JSON.
"#;

/// Greener alternatives for the trip.
pub const ECO_SUGGESTIONS: &str = r#"You are a sustainable travel advisor.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Suggest:
- Greener transport options
- Eco-friendly activities
- Sustainable accommodation suggestions
Return structured JSON.
"#;

/// Hotel options by budget tier.
pub const HOTELS: &str = r#"You are a global hotel recommender.

Trip details:
- Destination: {{location}}
- Dates: {{startDate}} to {{endDate}}
- Budget: {{budget}}
- Travel style: {{travelStyle}}
- Eco-friendly: {{ecoFriendly}}
- Dynamic replanning: {{dynamicReplanning}}

Return hotel options by budget tier as JSON:
{
  "budget_hotels": [],
  "mid_range_hotels": [],
  "luxury_hotels": []
}
"#;

/// Context-aware travel chatbot.
pub const CHAT: &str = r#"You are TourMuse, an intelligent travel assistant capable of understanding
and modifying user itineraries with full context.

Here is the context:
- Current plan: {{current_plan}}
- Budget: {{budget}}
- Optimized budget: {{optimized_budget}}
- Replanned itinerary: {{replan}}
- Eco suggestions: {{eco_suggestions}}
- Hotels: {{hotels}}
- City guide: {{city_guide}}

User's message:
"{{user_message}}"

Using the above context:
- Answer the user's query precisely.
- If they request modifications, propose clear actionable changes to the
  itinerary, considering the budget, eco-friendliness, and user preferences.
- If they ask for information about a place, use the city guide and related
  context.
- Keep the response warm, helpful, and concise.
"#;

/// Handlebars wrapper shared by all prompt rendering.
pub struct Prompts {
    hbs: Handlebars<'static>,
}

impl Prompts {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(no_escape);
        Self { hbs }
    }

    /// Render `template` with every declared placeholder resolved from
    /// `inputs`, defaulting absentees to [`NOT_AVAILABLE`].
    pub fn render(
        &self,
        template: &str,
        placeholders: &[&str],
        inputs: &TaskInputs,
    ) -> Result<String, Error> {
        let mut data: BTreeMap<&str, String> = BTreeMap::new();
        for &name in placeholders {
            let value = inputs
                .resolve(name)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            data.insert(name, value);
        }
        Ok(self.hbs.render_template(template, &data)?)
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent;
    use crate::capability::Capability;
    use proptest::prelude::*;

    fn trip_placeholders() -> &'static [&'static str] {
        agent::descriptor(Capability::Plan).agent.placeholders
    }

    #[test]
    fn absent_placeholders_render_as_not_available() {
        let chat = agent::descriptor(Capability::Chat);
        let mut inputs = TaskInputs::new();
        inputs.set("user_message", "hello");

        let rendered = Prompts::new()
            .render(chat.agent.template, chat.agent.placeholders, &inputs)
            .unwrap();

        assert!(rendered.contains("hello"));
        assert_eq!(rendered.matches(NOT_AVAILABLE).count(), 7);
    }

    #[test]
    fn present_placeholders_are_substituted() {
        let mut inputs = TaskInputs::new();
        inputs.set("location", "Paris");

        let rendered = Prompts::new()
            .render(PLAN, trip_placeholders(), &inputs)
            .unwrap();

        assert!(rendered.contains("Destination: Paris"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn values_are_not_html_escaped() {
        let mut inputs = TaskInputs::new();
        inputs.set("location", "Goa & Kochi <beaches>");

        let rendered = Prompts::new()
            .render(PLAN, trip_placeholders(), &inputs)
            .unwrap();

        assert!(rendered.contains("Goa & Kochi <beaches>"));
    }

    #[test]
    fn undeclared_template_variable_is_a_render_error() {
        let inputs = TaskInputs::new();
        let err = Prompts::new()
            .render("hello {{mystery}}", &[], &inputs)
            .unwrap_err();
        assert_eq!(err.kind(), "render");
    }

    proptest! {
        #[test]
        fn substitution_is_total_over_any_input_subset(
            present in proptest::sample::subsequence(
                trip_placeholders().to_vec(),
                0..=trip_placeholders().len(),
            )
        ) {
            let mut inputs = TaskInputs::new();
            for name in &present {
                inputs.set(*name, format!("{name}-value"));
            }

            let rendered = Prompts::new()
                .render(PLAN, trip_placeholders(), &inputs)
                .unwrap();

            prop_assert!(!rendered.contains("{{"));
            prop_assert_eq!(
                rendered.matches(NOT_AVAILABLE).count(),
                trip_placeholders().len() - present.len()
            );
        }
    }
}
