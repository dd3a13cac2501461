//! The nine fixed capabilities exposed by the backend.

use std::fmt;

/// One of the nine operations a request can ask for.
///
/// Every capability except `Chat` stores its result in the per-user context
/// under [`context_key`](Capability::context_key); the chatbot only reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Plan,
    Budget,
    OptimizeBudget,
    Replan,
    PlaceDetails,
    CityGuide,
    EcoSuggestions,
    Hotels,
    Chat,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::Plan,
        Capability::Budget,
        Capability::OptimizeBudget,
        Capability::Replan,
        Capability::PlaceDetails,
        Capability::CityGuide,
        Capability::EcoSuggestions,
        Capability::Hotels,
        Capability::Chat,
    ];

    /// The seven capabilities whose stored results feed the chatbot prompt.
    ///
    /// `PlaceDetails` is stored but deliberately left out: a one-off place
    /// lookup is not trip state the chatbot needs to stay consistent with.
    pub const CHAT_TRACKED: [Capability; 7] = [
        Capability::Plan,
        Capability::Budget,
        Capability::OptimizeBudget,
        Capability::Replan,
        Capability::EcoSuggestions,
        Capability::Hotels,
        Capability::CityGuide,
    ];

    /// Store key this capability's result is saved under, `None` for the
    /// chatbot which never writes.
    pub fn context_key(self) -> Option<&'static str> {
        match self {
            Capability::Plan => Some("current_plan"),
            Capability::Budget => Some("budget"),
            Capability::OptimizeBudget => Some("optimized_budget"),
            Capability::Replan => Some("replan"),
            Capability::PlaceDetails => Some("place_details"),
            Capability::CityGuide => Some("city_guide"),
            Capability::EcoSuggestions => Some("eco_suggestions"),
            Capability::Hotels => Some("hotels"),
            Capability::Chat => None,
        }
    }

    /// HTTP route that serves this capability.
    pub fn route(self) -> &'static str {
        match self {
            Capability::Plan => "/generate-plan",
            Capability::Budget => "/compute-budget",
            Capability::OptimizeBudget => "/optimize-budget",
            Capability::Replan => "/replan",
            Capability::PlaceDetails => "/place-details",
            Capability::CityGuide => "/city-guide",
            Capability::EcoSuggestions => "/eco-suggestions",
            Capability::Hotels => "/generate-hotels",
            Capability::Chat => "/chatbot",
        }
    }

    /// Top-level field wrapping the result in the success response body.
    pub fn response_field(self) -> &'static str {
        match self {
            Capability::Plan => "plan",
            Capability::Budget => "budget",
            Capability::OptimizeBudget => "optimized_plan",
            Capability::Replan => "replanned_plan",
            Capability::PlaceDetails => "place_details",
            Capability::CityGuide => "city_guide",
            Capability::EcoSuggestions => "eco_suggestions",
            Capability::Hotels => "hotels",
            Capability::Chat => "response",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Plan => "plan",
            Capability::Budget => "budget",
            Capability::OptimizeBudget => "optimize_budget",
            Capability::Replan => "replan",
            Capability::PlaceDetails => "place_details",
            Capability::CityGuide => "city_guide",
            Capability::EcoSuggestions => "eco_suggestions",
            Capability::Hotels => "hotels",
            Capability::Chat => "chat",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn routes_are_unique() {
        let routes: HashSet<_> = Capability::ALL.iter().map(|c| c.route()).collect();
        assert_eq!(routes.len(), Capability::ALL.len());
    }

    #[test]
    fn only_chat_lacks_a_context_key() {
        for capability in Capability::ALL {
            match capability {
                Capability::Chat => assert!(capability.context_key().is_none()),
                _ => assert!(capability.context_key().is_some()),
            }
        }
    }

    #[test]
    fn chat_tracked_omits_place_details_and_chat() {
        assert!(!Capability::CHAT_TRACKED.contains(&Capability::PlaceDetails));
        assert!(!Capability::CHAT_TRACKED.contains(&Capability::Chat));
        assert_eq!(Capability::CHAT_TRACKED.len(), 7);
    }

    #[test]
    fn optimize_and_replan_store_under_their_own_keys() {
        // The stored keys are what the chatbot reads back; they must match
        // what the router writes, not the response field names.
        assert_eq!(Capability::OptimizeBudget.context_key(), Some("optimized_budget"));
        assert_eq!(Capability::Replan.context_key(), Some("replan"));
        assert_eq!(Capability::OptimizeBudget.response_field(), "optimized_plan");
        assert_eq!(Capability::Replan.response_field(), "replanned_plan");
    }
}
