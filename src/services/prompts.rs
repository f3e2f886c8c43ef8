//! Prompt templates for recommendation generation.
//!
//! Four system prompts share the same persona, field contract and phrase
//! guidance; they differ in the task line. User prompts carry the query or
//! the reference cards.

use crate::models::{FeedbackEntry, ReferenceItem};

const PERSONA: &str = "You are a creative recommendation engine.";

const OUTPUT_FORMAT: &str = "For each recommendation provide:
- title: A catchy, short title (2-5 words)
- description: A very concise description (MAX 100 characters, be brief!)
- visual_search_phrase: A VERY SPECIFIC 2-4 word visual search phrase that precisely represents this recommendation.
- url: A real, working website URL directly related to the item";

const PHRASE_GUIDANCE: &str = "Examples of GOOD search phrases:
* \"japanese ramen bowl close up\"
* \"northern lights over mountains\"
* \"minimalist scandinavian interior\"
* \"golden retriever puppy playing\"

Examples of BAD (too generic) search phrases:
* \"food\" (too vague)
* \"nature\" (too broad)
* \"design\" (not specific enough)

CRITICAL: Each visual_search_phrase must be:
1. Highly specific and visual (not abstract concepts)
2. Different from the other results
3. Likely to return a clear, recognizable photo on an image search";

/// A system/user prompt pair ready to send to the model
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn system_prompt(task: &str, closing: &str) -> String {
    format!("{PERSONA} {task}\n\n{OUTPUT_FORMAT}\n\n{PHRASE_GUIDANCE}\n\n{closing}")
}

/// Two-line title/description block, description aligned under the title
fn item(label: &str, title: &str, description: &str) -> String {
    let indent = " ".repeat(label.len());
    format!("{label}Title: {title}\n{indent}Description: {description}\n")
}

/// Fresh search with no feedback trail
pub fn fresh(query: &str, count: usize) -> Prompt {
    let system = system_prompt(
        &format!(
            "Generate {count} diverse, interesting recommendations based on the user's query. \
             Each recommendation should be something visual and discoverable online \
             (products, websites, concepts, places, activities, etc.)."
        ),
        "Make the recommendations diverse and interesting. Prioritize things with strong visual identity.",
    );

    Prompt {
        system,
        user: format!("Query: {query}"),
    }
}

/// Fresh search steered by earlier similar/different reactions
pub fn fresh_with_feedback(query: &str, history: &[FeedbackEntry], count: usize) -> Prompt {
    let system = system_prompt(
        &format!(
            "Generate {count} diverse, interesting recommendations based on the user's query \
             and their reactions to earlier recommendations. Lean toward items like the ones \
             marked SIMILAR and away from items like the ones marked DIFFERENT."
        ),
        "Keep the recommendations diverse, visual, and consistent with the user's feedback.",
    );

    let feedback: String = history
        .iter()
        .map(|entry| format!("- {} to: {}\n", entry.feedback, entry.title))
        .collect();

    let user = format!(
        "Query: {query}\n\nFeedback on earlier recommendations:\n{feedback}\n\
         Use this feedback to steer the {count} new recommendations."
    );

    Prompt { system, user }
}

/// Refinement producing items similar to the reference card
pub fn refine_similar(reference: &ReferenceItem, count: usize) -> Prompt {
    let system = system_prompt(
        "Generate recommendations that are SIMILAR to the reference item provided. \
         The recommendations should share common themes, style, category, or \
         characteristics with the reference.",
        "Make the recommendations diverse but clearly related to the reference item.",
    );

    let user = format!(
        "Reference item (generate {count} items SIMILAR to this):\n{}\n\
         Generate {count} recommendations that are similar to this reference item.",
        item("", &reference.clicked.title, &reference.clicked.description)
    );

    Prompt { system, user }
}

/// Refinement producing one item that contrasts with the reference card but
/// fits the two cards the user left alone
pub fn refine_different(reference: &ReferenceItem) -> Prompt {
    let system = system_prompt(
        "Generate a recommendation that is DIFFERENT from the reference item but MORE \
         ALIGNED with the direction suggested by the other items.",
        "The recommendation should contrast with the reference item but fit better with the other items.",
    );

    let mut user = String::from("Reference item (generate something DIFFERENT from this):\n");
    user.push_str(&item(
        "",
        &reference.clicked.title,
        &reference.clicked.description,
    ));

    user.push_str("\nOther items in the set (generate something more aligned with these):\n");
    for (i, other) in reference.others().iter().enumerate() {
        user.push_str(&item(
            &format!("{}. ", i + 1),
            &other.title,
            &other.description,
        ));
    }

    user.push_str(
        "\nGenerate 1 recommendation that is different from the reference but more aligned with the other items.",
    );

    Prompt { system, user }
}
