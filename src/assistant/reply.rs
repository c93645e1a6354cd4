//! Keyword-matching reply generation for the nutrition assistant.

use crate::nutrition::EnergyTarget;

/// Opening assistant message seeded into an empty transcript
pub const GREETING: &str =
    "Hi! I'm your nutrition assistant. How can I help you today?";

/// Suggested prompts surfaced by clients next to the input box
pub const QUICK_QUESTIONS: [&str; 4] = [
    "How many calories should I eat?",
    "Healthy snack suggestions",
    "How do I get more protein?",
    "Recipes for losing weight",
];

/// Profile context the reply engine may personalize with
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub target: Option<EnergyTarget>,
}

/// Generate a reply for a user message.
///
/// Matching is case-insensitive keyword search over the message text,
/// first topic wins: calories, snacks, protein, recipes/weight loss,
/// then a generic fallback.
pub fn generate_reply(message: &str, context: &AssistantContext) -> String {
    let lower = message.to_lowercase();

    if lower.contains("calorie") || lower.contains("kcal") {
        return calorie_reply(context);
    }

    if lower.contains("snack") {
        return "Here are some healthy snack options:\n\n\
                • Greek yogurt with berries\n\
                • A handful of mixed nuts (30g)\n\
                • Apple slices with peanut butter\n\
                • Carrot sticks with hummus\n\
                • A hard-boiled egg\n\n\
                All of them are nutrient-dense and help keep you full between meals."
            .to_string();
    }

    if lower.contains("protein") {
        return "To get more protein into your diet, reach for:\n\n\
                • Lean meats (chicken, fish, lean beef)\n\
                • Eggs\n\
                • Legumes (beans, lentils, chickpeas)\n\
                • Dairy (Greek yogurt, cottage cheese)\n\
                • Quinoa and oats\n\n\
                A common target is 1.6-2.2g of protein per kg of body weight per day."
            .to_string();
    }

    if lower.contains("recipe") || lower.contains("lose weight") || lower.contains("weight loss") {
        return "Here's a simple recipe that works well for weight loss:\n\n\
                Quinoa & Chicken Salad\n\n\
                Ingredients:\n\
                • 100g cooked quinoa\n\
                • 120g grilled chicken breast\n\
                • Mixed salad greens\n\
                • Cherry tomatoes\n\
                • Cucumber\n\
                • Olive oil and lemon to dress\n\n\
                Around 350 kcal per serving, high in protein and fiber."
            .to_string();
    }

    "I can help with healthy eating, calorie targets, meal suggestions, and \
     nutrition tips. What would you like to know?"
        .to_string()
}

fn calorie_reply(context: &AssistantContext) -> String {
    match &context.target {
        Some(target) => format!(
            "Based on your profile, your daily target is {} kcal, split into \
             {}g protein, {}g carbs, and {}g fat. Staying within about 10% of \
             that target day to day is a good rhythm; for weight loss, a \
             300-500 kcal daily deficit through diet and exercise is the \
             sustainable range.",
            target.daily_calories, target.daily_protein, target.daily_carbs, target.daily_fat
        ),
        None => "I don't have your calorie target yet - finish onboarding with your \
                 age, weight, height, activity level, and goal, and I'll compute a \
                 personalized daily target for you."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> EnergyTarget {
        EnergyTarget {
            daily_calories: 2035,
            daily_protein: 127,
            daily_carbs: 229,
            daily_fat: 68,
        }
    }

    #[test]
    fn test_calorie_reply_uses_profile_target() {
        let context = AssistantContext {
            target: Some(target()),
        };
        let reply = generate_reply("How many calories should I eat?", &context);
        assert!(reply.contains("2035 kcal"));
        assert!(reply.contains("127g protein"));
    }

    #[test]
    fn test_calorie_reply_without_profile_asks_for_onboarding() {
        let reply = generate_reply("what about my CALORIES?", &AssistantContext::default());
        assert!(reply.contains("onboarding"));
    }

    #[test]
    fn test_topic_matching() {
        let context = AssistantContext::default();
        assert!(generate_reply("any snack ideas?", &context).contains("Greek yogurt"));
        assert!(generate_reply("I need more PROTEIN", &context).contains("1.6-2.2g"));
        assert!(generate_reply("a recipe please", &context).contains("Quinoa"));
        assert!(generate_reply("how do I lose weight?", &context).contains("weight loss"));
    }

    #[test]
    fn test_fallback() {
        let reply = generate_reply("tell me a joke", &AssistantContext::default());
        assert!(reply.contains("What would you like to know?"));
    }
}
