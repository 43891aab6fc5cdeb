//! Scripted replies for seeded profiles.
//!
//! The AI API is preferred when it answers; this generator is the fallback.
//! Replies are a pure function of the persona, the latest message, a short
//! history, and the caller's RNG.

mod templates;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use haven_shared::types::ProfileSummary;

use crate::clients::ai::{ChatRole, ChatTurn};

/// The seeded profile's attributes as the generator sees them.
#[derive(Debug, Clone, Default)]
pub struct Persona {
    pub name: String,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub interests: Vec<String>,
    pub goals: Option<String>,
    pub communication_style: Option<String>,
    pub bio: Option<String>,
}

impl From<&ProfileSummary> for Persona {
    fn from(profile: &ProfileSummary) -> Self {
        Self {
            name: profile.display_name.clone().unwrap_or_else(|| "Someone".into()),
            age: profile.age,
            location: profile.location.clone(),
            occupation: profile.occupation.clone(),
            interests: profile.interests.clone(),
            goals: profile.goals.clone(),
            communication_style: profile.communication_style.clone(),
            bio: profile.bio.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFamily {
    Greeting,
    Introduction,
    Location,
    Age,
    Occupation,
    Interests,
    Goals,
    Question,
    Statement,
}

struct Patterns {
    greeting: Regex,
    /// "my name is X", "call me X": the phrase alone marks X as a name.
    stated_name: Regex,
    /// "i'm X", "i am X": X may just as well be an adjective.
    self_intro: Regex,
    location: Regex,
    age: Regex,
    occupation: Regex,
    interests: Regex,
    goals: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            greeting: Regex::new(
                r"^(hi+|hey+|hello+|hiya|howdy|yo|heya|sup|greetings|good (morning|afternoon|evening))\b",
            )?,
            stated_name: Regex::new(
                r"(?i)\b(?:my name is|call me|name['’]?s)\s+([a-z][a-z'\-]{0,29})\b",
            )?,
            self_intro: Regex::new(r"(?i:\bi['’]?m|\bi am)\s+([A-Za-z][A-Za-z'\-]{0,29})\b")?,
            location: Regex::new(
                r"where\b.*\b(live|from|based|located)\b|\blocation\b|what (city|town|part of)",
            )?,
            age: Regex::new(r"how old|your age|\bage\b")?,
            occupation: Regex::new(
                r"what do you do|\bwork\b|\bjob\b|\bcareer\b|occupation|for a living",
            )?,
            interests: Regex::new(r"hobb|interest|for fun|\binto\b|free time|passion")?,
            goals: Regex::new(
                r"looking for|\bgoals?\b|on here for|what brings you|(want|hoping) to find",
            )?,
        })
    }
}

static PATTERNS: Lazy<Result<Patterns, regex::Error>> = Lazy::new(Patterns::new);

/// Words that commonly follow "i'm" without being a name.
const NOT_A_NAME: &[&str] = &[
    "a", "an", "the", "not", "so", "just", "good", "fine", "great", "ok", "okay", "well", "doing",
    "tired", "from", "here", "new", "looking", "really", "very", "happy", "sorry", "interested",
    "into", "in", "at", "on", "going", "trying", "feeling", "also", "still", "pretty", "kind",
    "sure", "glad", "excited", "bored", "busy", "back", "home", "out", "free", "single", "married",
    "working", "currently", "literally", "actually", "always", "never", "kinda", "super", "bad",
    "alright", "all", "too", "like", "about", "only", "shy", "nervous", "autistic", "adhd",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub family: ReplyFamily,
    /// Name the user introduced in this message, capitalized.
    pub user_name: Option<String>,
}

/// Run the ordered predicates over the lower-cased input; the first hit wins.
pub fn classify(input: &str) -> Classification {
    let text = input.trim().to_lowercase();
    let Ok(patterns) = PATTERNS.as_ref() else {
        tracing::error!("reply patterns failed to compile");
        return fallback_classification(&text);
    };

    let user_name = introduced_name(patterns, input.trim(), &text);
    let family = if patterns.greeting.is_match(&text) && user_name.is_none() {
        ReplyFamily::Greeting
    } else if user_name.is_some() {
        ReplyFamily::Introduction
    } else if patterns.location.is_match(&text) {
        ReplyFamily::Location
    } else if patterns.age.is_match(&text) {
        ReplyFamily::Age
    } else if patterns.occupation.is_match(&text) {
        ReplyFamily::Occupation
    } else if patterns.interests.is_match(&text) {
        ReplyFamily::Interests
    } else if patterns.goals.is_match(&text) {
        ReplyFamily::Goals
    } else if text.contains('?') {
        ReplyFamily::Question
    } else {
        ReplyFamily::Statement
    };

    Classification { family, user_name }
}

fn fallback_classification(text: &str) -> Classification {
    let family = if text.contains('?') {
        ReplyFamily::Question
    } else {
        ReplyFamily::Statement
    };
    Classification {
        family,
        user_name: None,
    }
}

/// `original` keeps the user's casing; `lowered` is the same text lower-cased.
///
/// After "i'm" only a capitalized word counts, or a lowercase one that ends a
/// greeting message ("hey i'm sam"). "i'm hungry" is not an introduction.
fn introduced_name(patterns: &Patterns, original: &str, lowered: &str) -> Option<String> {
    let is_name = |word: &str| !NOT_A_NAME.contains(&word.to_lowercase().as_str());

    let stated = patterns
        .stated_name
        .captures_iter(original)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|word| is_name(word));
    if let Some(word) = stated {
        return Some(capitalize(&word.to_lowercase()));
    }

    let greeted = patterns.greeting.is_match(lowered);
    patterns
        .self_intro
        .captures_iter(original)
        .filter_map(|caps| caps.get(1))
        .find(|m| {
            let word = m.as_str();
            let capitalized = word.starts_with(|c: char| c.is_uppercase());
            let ends_message = original[m.end()..]
                .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '!' | ','))
                .is_empty();
            is_name(word) && (capitalized || (greeted && ends_message))
        })
        .map(|m| capitalize(&m.as_str().to_lowercase()))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The most recent name the user introduced in `history`, if any.
fn remembered_name(history: &[ChatTurn]) -> Option<String> {
    history
        .iter()
        .rev()
        .filter(|turn| turn.role == ChatRole::User)
        .find_map(|turn| classify(&turn.content).user_name)
}

/// Pick and fill a canned reply from `persona` to `input`.
pub fn canned_reply<R: Rng + ?Sized>(
    persona: &Persona,
    input: &str,
    history: &[ChatTurn],
    rng: &mut R,
) -> String {
    let classification = classify(input);
    let user_name = classification
        .user_name
        .clone()
        .or_else(|| remembered_name(history));

    let family = templates_for(classification.family, persona);
    let candidates: Vec<&str> = family
        .iter()
        .copied()
        .filter(|t| user_name.is_some() || !t.contains("{user_name}"))
        .collect();

    let template = candidates
        .choose(rng)
        .or_else(|| templates::STATEMENT.choose(rng))
        .copied()
        .unwrap_or("Tell me more?");

    interpolate(template, persona, user_name.as_deref(), rng)
}

fn templates_for(family: ReplyFamily, persona: &Persona) -> &'static [&'static str] {
    match family {
        ReplyFamily::Greeting => templates::GREETING,
        ReplyFamily::Introduction => templates::INTRODUCTION,
        ReplyFamily::Location if persona.location.is_some() => templates::LOCATION,
        ReplyFamily::Location => templates::LOCATION_UNKNOWN,
        ReplyFamily::Age if persona.age.is_some() => templates::AGE,
        ReplyFamily::Age => templates::AGE_UNKNOWN,
        ReplyFamily::Occupation if persona.occupation.is_some() => templates::OCCUPATION,
        ReplyFamily::Occupation => templates::OCCUPATION_UNKNOWN,
        ReplyFamily::Interests => templates::INTERESTS,
        ReplyFamily::Goals if persona.goals.is_some() => templates::GOALS,
        ReplyFamily::Goals => templates::GOALS_UNKNOWN,
        ReplyFamily::Question => templates::QUESTION,
        ReplyFamily::Statement => templates::STATEMENT,
    }
}

fn interpolate<R: Rng + ?Sized>(
    template: &str,
    persona: &Persona,
    user_name: Option<&str>,
    rng: &mut R,
) -> String {
    let interest = persona
        .interests
        .choose(rng)
        .map(String::as_str)
        .unwrap_or("a few different things");
    let age = persona.age.map(|a| a.to_string()).unwrap_or_default();

    template
        .replace("{name}", &persona.name)
        .replace("{location}", persona.location.as_deref().unwrap_or("around here"))
        .replace("{age}", &age)
        .replace("{occupation}", persona.occupation.as_deref().unwrap_or("a bit of everything"))
        .replace("{interest}", interest)
        .replace("{goals}", persona.goals.as_deref().unwrap_or("something real"))
        .replace("{user_name}", user_name.unwrap_or("there"))
}

/// Instructions sent to the AI API so it answers in the seeded profile's voice.
pub fn system_prompt(persona: &Persona) -> String {
    let mut prompt = format!(
        "You are {}, chatting with a match on Haven, a dating app for neurodivergent people.",
        persona.name
    );
    if let Some(age) = persona.age {
        prompt.push_str(&format!(" You are {age} years old."));
    }
    if let Some(location) = &persona.location {
        prompt.push_str(&format!(" You live in {location}."));
    }
    if let Some(occupation) = &persona.occupation {
        prompt.push_str(&format!(" You work in {occupation}."));
    }
    if !persona.interests.is_empty() {
        prompt.push_str(&format!(" Your interests: {}.", persona.interests.join(", ")));
    }
    if let Some(goals) = &persona.goals {
        prompt.push_str(&format!(" On Haven you are looking for {goals}."));
    }
    if let Some(style) = &persona.communication_style {
        prompt.push_str(&format!(" Your communication style is {style}."));
    }
    if let Some(bio) = &persona.bio {
        prompt.push_str(&format!(" Your bio: {bio}"));
    }
    prompt.push_str(
        " Stay in character. Reply in one to three short sentences, plainly and kindly, without sarcasm or idioms that are easy to misread.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn jamie() -> Persona {
        Persona {
            name: "Jamie".into(),
            age: Some(28),
            location: Some("Seattle".into()),
            occupation: Some("illustration".into()),
            interests: vec!["board games".into(), "birdwatching".into()],
            goals: Some("a slow-burn relationship".into()),
            communication_style: Some("gentle".into()),
            bio: None,
        }
    }

    #[test]
    fn patterns_compile() {
        assert!(PATTERNS.is_ok());
    }

    #[test]
    fn introduction_reply_uses_the_introduced_name() {
        assert_eq!(classify("Hi I'm Alex").family, ReplyFamily::Introduction);
        assert_eq!(classify("Hi I'm Alex").user_name.as_deref(), Some("Alex"));

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let reply = canned_reply(&jamie(), "Hi I'm Alex", &[], &mut rng);
            assert!(reply.contains("Alex"), "seed {seed}: {reply}");
        }
    }

    #[test]
    fn location_question_mentions_persona_location() {
        assert_eq!(classify("where do you live?").family, ReplyFamily::Location);

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let reply = canned_reply(&jamie(), "where do you live?", &[], &mut rng);
            assert!(reply.contains("Seattle"), "seed {seed}: {reply}");
        }
    }

    #[test]
    fn predicates_apply_in_order() {
        let cases = [
            ("hey!", ReplyFamily::Greeting),
            ("Good morning :)", ReplyFamily::Greeting),
            ("my name is sam", ReplyFamily::Introduction),
            ("call me Riley", ReplyFamily::Introduction),
            ("where are you from", ReplyFamily::Location),
            ("how old are you?", ReplyFamily::Age),
            ("what do you do for work?", ReplyFamily::Occupation),
            ("any hobbies?", ReplyFamily::Interests),
            ("what are you looking for on here", ReplyFamily::Goals),
            ("do you like pineapple pizza?", ReplyFamily::Question),
            ("i had a long day", ReplyFamily::Statement),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input).family, expected, "{input}");
        }
    }

    #[test]
    fn common_phrases_are_not_names() {
        assert_eq!(classify("i'm so tired today").user_name, None);
        assert_eq!(classify("I am from Denver").user_name, None);
        assert_eq!(
            classify("i'm from denver, where are you from?").family,
            ReplyFamily::Location
        );
    }

    #[test]
    fn adjectives_after_im_are_not_names() {
        let hungry = classify("i'm hungry lol");
        assert_eq!(hungry.user_name, None);
        assert_eq!(hungry.family, ReplyFamily::Statement);

        let vegan = classify("i'm vegan, are you?");
        assert_eq!(vegan.user_name, None);
        assert_eq!(vegan.family, ReplyFamily::Question);

        assert_eq!(classify("i'm hungry").user_name, None);
        assert_eq!(classify("hey, i'm exhausted lol").family, ReplyFamily::Greeting);
    }

    #[test]
    fn names_are_taken_from_casing_or_a_closing_greeting() {
        assert_eq!(classify("I'm Priya, nice to meet you").user_name.as_deref(), Some("Priya"));
        assert_eq!(classify("hey i'm sam!").user_name.as_deref(), Some("Sam"));
        assert_eq!(classify("MY NAME IS JO").user_name.as_deref(), Some("Jo"));
    }

    #[test]
    fn greeting_uses_name_remembered_from_history() {
        let history = vec![
            ChatTurn::user("hello, i'm Morgan"),
            ChatTurn::assistant("Nice to meet you, Morgan!"),
        ];
        let mut seen_name = false;
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let reply = canned_reply(&jamie(), "hey", &history, &mut rng);
            assert!(!reply.contains('{'), "unfilled placeholder: {reply}");
            seen_name |= reply.contains("Morgan");
        }
        assert!(seen_name);
    }

    #[test]
    fn missing_attributes_use_neutral_templates() {
        let sparse = Persona {
            name: "Ari".into(),
            ..Default::default()
        };
        let inputs = ["where do you live?", "how old are you", "hey", "what are your hobbies"];
        for (seed, input) in inputs.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let reply = canned_reply(&sparse, input, &[], &mut rng);
            assert!(!reply.contains('{'), "{input}: {reply}");
        }
    }

    #[test]
    fn system_prompt_carries_persona_attributes() {
        let prompt = system_prompt(&jamie());
        assert!(prompt.starts_with("You are Jamie"));
        assert!(prompt.contains("Seattle"));
        assert!(prompt.contains("board games, birdwatching"));
    }
}
