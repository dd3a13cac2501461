//! Agent and task definitions for the nine capabilities.
//!
//! An agent here is a fixed prompt configuration: a persona, a template, and
//! the placeholder names the template may reference. A task descriptor pairs
//! a capability with its agent and an advisory description of the expected
//! output. Nothing in this module talks to the model; execution lives in
//! [`crate::executor`].

use crate::capability::Capability;
use crate::prompts;

/// Fixed persona and template configuration behind one capability.
#[derive(Debug, Clone, Copy)]
pub struct AgentSpec {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub template: &'static str,
    /// Placeholders the template may reference. Absent inputs render as
    /// "Not available"; any other template variable fails the render.
    pub placeholders: &'static [&'static str],
    /// Internal refinement attempts the engine may spend before returning
    /// best-effort output. 1 everywhere except the planner.
    pub refine_budget: u32,
}

/// Pairs a capability with its agent and output contract.
#[derive(Debug, Clone, Copy)]
pub struct TaskDescriptor {
    pub capability: Capability,
    pub agent: AgentSpec,
    /// Advisory output shape, appended to the prompt; never validated.
    pub expected_output: &'static str,
    /// Declared tool dependencies. No external tools are wired up; every
    /// descriptor currently declares none.
    pub tools: &'static [&'static str],
}

const TRIP_PLACEHOLDERS: &[&str] = &[
    "location",
    "startDate",
    "endDate",
    "budget",
    "travelStyle",
    "ecoFriendly",
    "dynamicReplanning",
];

const PLACE_PLACEHOLDERS: &[&str] = &["place_name", "location", "date"];

const CHAT_PLACEHOLDERS: &[&str] = &[
    "user_message",
    "current_plan",
    "budget",
    "optimized_budget",
    "replan",
    "eco_suggestions",
    "hotels",
    "city_guide",
];

static PLANNER: TaskDescriptor = TaskDescriptor {
    capability: Capability::Plan,
    agent: AgentSpec {
        role: "Planner Agent",
        goal: "Generate a clear, user-friendly, day-wise travel timetable for the requested trip.",
        backstory: "Expert travel planner with knowledge of world travel timings, optimal routes, \
                    and local highlights.",
        template: prompts::PLAN,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 3,
    },
    expected_output: "JSON itinerary matching the frontend's daily slots.",
    tools: &[],
};

static BUDGETER: TaskDescriptor = TaskDescriptor {
    capability: Capability::Budget,
    agent: AgentSpec {
        role: "Budget Agent",
        goal: "Calculate a detailed budget split for accommodation, meals, transport, activities, \
               and shopping within the user's limit.",
        backstory: "Expert travel budget analyst with data on typical costs in various cities.",
        template: prompts::BUDGET,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "Budget JSON with day-wise and category-wise costs.",
    tools: &[],
};

static OPTIMIZER: TaskDescriptor = TaskDescriptor {
    capability: Capability::OptimizeBudget,
    agent: AgentSpec {
        role: "Optimizer Agent",
        goal: "Suggest ways to reduce costs in specific categories while retaining trip quality.",
        backstory: "Optimization expert for travel costs.",
        template: prompts::OPTIMIZE_BUDGET,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "Optimized plan JSON.",
    tools: &[],
};

static REPLANNER: TaskDescriptor = TaskDescriptor {
    capability: Capability::Replan,
    agent: AgentSpec {
        role: "Replanner Agent",
        goal: "Generate an alternate itinerary based on weather changes, event conflicts, or user \
               dissatisfaction.",
        backstory: "Expert in replanning travel based on live updates.",
        template: prompts::REPLAN,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "Replanned itinerary JSON.",
    tools: &[],
};

static PLACE: TaskDescriptor = TaskDescriptor {
    capability: Capability::PlaceDetails,
    agent: AgentSpec {
        role: "Place Agent",
        goal: "Provide detailed information for a specific place in the itinerary.",
        backstory: "Place information expert with data on attractions.",
        template: prompts::PLACE_DETAILS,
        placeholders: PLACE_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "Structured JSON for the place details modal.",
    tools: &[],
};

static CITY_GUIDE: TaskDescriptor = TaskDescriptor {
    capability: Capability::CityGuide,
    agent: AgentSpec {
        role: "City Guide Agent",
        goal: "Provide local information including visa info, customs, public transport tips, and \
               local events.",
        backstory: "Expert city guide bot.",
        template: prompts::CITY_GUIDE,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "JSON for the city guide page.",
    tools: &[],
};

static ECO: TaskDescriptor = TaskDescriptor {
    capability: Capability::EcoSuggestions,
    agent: AgentSpec {
        role: "Eco Agent",
        goal: "Suggest eco-friendly alternatives for transport and activities.",
        backstory: "Expert in sustainable travel planning.",
        template: prompts::ECO_SUGGESTIONS,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "List of eco-friendly recommendations in JSON.",
    tools: &[],
};

static HOTEL: TaskDescriptor = TaskDescriptor {
    capability: Capability::Hotels,
    agent: AgentSpec {
        role: "Hotel Generator Agent",
        goal: "Generate hotel options by budget tier.",
        backstory: "Global hotel recommender.",
        template: prompts::HOTELS,
        placeholders: TRIP_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "Hotels JSON by tier.",
    tools: &[],
};

static CHATBOT: TaskDescriptor = TaskDescriptor {
    capability: Capability::Chat,
    agent: AgentSpec {
        role: "City and Itinerary Chatbot",
        goal: "Answer user questions about cities and places and modify travel plans on demand.",
        backstory: "A friendly and accurate travel chatbot for TourMuse. Answers questions about \
                    cities, food, transport, and attractions, and modifies itineraries on request \
                    while respecting user preferences like eco-friendliness and budget.",
        template: prompts::CHAT,
        placeholders: CHAT_PLACEHOLDERS,
        refine_budget: 1,
    },
    expected_output: "A helpful, clear, and accurate response to the user's travel-related \
                      question or a modified itinerary.",
    tools: &[],
};

/// Look up the descriptor serving a capability.
pub fn descriptor(capability: Capability) -> &'static TaskDescriptor {
    match capability {
        Capability::Plan => &PLANNER,
        Capability::Budget => &BUDGETER,
        Capability::OptimizeBudget => &OPTIMIZER,
        Capability::Replan => &REPLANNER,
        Capability::PlaceDetails => &PLACE,
        Capability::CityGuide => &CITY_GUIDE,
        Capability::EcoSuggestions => &ECO,
        Capability::Hotels => &HOTEL,
        Capability::Chat => &CHATBOT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_vars(template: &str) -> Vec<&str> {
        let mut vars = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            rest = &rest[start + 2..];
            match rest.find("}}") {
                Some(end) => {
                    vars.push(rest[..end].trim());
                    rest = &rest[end + 2..];
                }
                None => break,
            }
        }
        vars
    }

    #[test]
    fn every_template_variable_is_declared() {
        for capability in Capability::ALL {
            let task = descriptor(capability);
            for var in template_vars(task.agent.template) {
                assert!(
                    task.agent.placeholders.contains(&var),
                    "{capability}: template references undeclared placeholder '{var}'"
                );
            }
        }
    }

    #[test]
    fn only_the_planner_has_a_refine_budget_above_one() {
        for capability in Capability::ALL {
            let expected = if capability == Capability::Plan { 3 } else { 1 };
            assert_eq!(descriptor(capability).agent.refine_budget, expected);
        }
    }

    #[test]
    fn chat_placeholders_cover_every_tracked_context_key() {
        let chat = descriptor(Capability::Chat);
        assert!(chat.agent.placeholders.contains(&"user_message"));
        for capability in Capability::CHAT_TRACKED {
            let key = capability.context_key().unwrap();
            assert!(
                chat.agent.placeholders.contains(&key),
                "chat template cannot see stored '{key}'"
            );
        }
        assert_eq!(chat.agent.placeholders.len(), Capability::CHAT_TRACKED.len() + 1);
    }

    #[test]
    fn descriptors_declare_no_tools() {
        for capability in Capability::ALL {
            assert!(descriptor(capability).tools.is_empty());
        }
    }

    #[test]
    fn descriptors_are_bound_to_their_capability() {
        for capability in Capability::ALL {
            assert_eq!(descriptor(capability).capability, capability);
        }
    }
}
