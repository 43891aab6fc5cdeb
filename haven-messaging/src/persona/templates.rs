//! Reply templates, one list per family.
//!
//! Placeholders: `{name}`, `{location}`, `{age}`, `{occupation}`,
//! `{interest}`, `{goals}`, `{user_name}`.

pub const GREETING: &[&str] = &[
    "Hey! Nice to hear from you. How's your day going?",
    "Hi there! I was hoping you'd say hello.",
    "Hello! I'm {name}. What's on your mind today?",
    "Hey hey! How are you doing?",
    "Hi {user_name}! Good to see you again.",
    "Hey {user_name}, how's everything?",
];

pub const INTRODUCTION: &[&str] = &[
    "Nice to meet you, {user_name}! I'm {name}.",
    "Hi {user_name}! Lovely name. I'm {name}, by the way.",
    "{user_name}, it's really nice to meet you. How's your week been?",
    "Hey {user_name}! I'm glad you said hi. What made you swipe right?",
];

pub const LOCATION: &[&str] = &[
    "I live in {location}. Have you ever been?",
    "{location}! It's home for me. Where are you based?",
    "I'm in {location}. I like the quiet spots more than the busy ones.",
    "Right now I'm in {location}. What about you?",
];

pub const LOCATION_UNKNOWN: &[&str] = &[
    "I move around a bit, honestly. Where are you?",
    "I'd rather keep that a little private for now, if that's okay. Where are you based?",
];

pub const AGE: &[&str] = &[
    "I'm {age}. How about you?",
    "{age}! Old enough to have strong opinions about snacks.",
    "I just turned {age}. Does that feel about right to you?",
];

pub const AGE_UNKNOWN: &[&str] = &[
    "Let's just say I'm old enough to know what I like. How old are you?",
];

pub const OCCUPATION: &[&str] = &[
    "I work in {occupation}. Some days are a lot, but I like it.",
    "My job? {occupation}. It suits me because I get to focus deeply. What do you do?",
    "{occupation}, mostly! What keeps you busy?",
];

pub const OCCUPATION_UNKNOWN: &[&str] = &[
    "I'm figuring out my next step right now. What do you do?",
];

pub const INTERESTS: &[&str] = &[
    "I'm really into {interest} lately. What about you?",
    "{interest} is my happy place. I could talk about it for hours.",
    "Honestly, {interest}. Do you have a special interest?",
    "A lot of my free time goes to {interest}. What do you do for fun?",
];

pub const GOALS: &[&str] = &[
    "I'm looking for {goals}. What about you?",
    "Honestly? {goals}. I like to be upfront about it.",
    "{goals}, ideally. No pressure though, I like taking things slow.",
];

pub const GOALS_UNKNOWN: &[&str] = &[
    "I'm open to seeing where things go. What are you hoping to find here?",
];

pub const QUESTION: &[&str] = &[
    "Ooh, good question. Let me think about that for a second.",
    "Hmm, I'm not totally sure! What would you say?",
    "That's a thoughtful question. What made you ask?",
    "I like that you asked. I'll give you an honest answer once I've thought it over.",
];

pub const STATEMENT: &[&str] = &[
    "That's really interesting. Tell me more?",
    "I totally get that.",
    "Thanks for sharing that with me.",
    "Ha, I love that. What happened next?",
    "That makes a lot of sense to me.",
];
