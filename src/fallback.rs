// src/fallback.rs
//! Keyword responder used when the NLU service is off, unreachable or unsure.
//!
//! Topics are tested in a fixed priority order and the first group with any
//! matching keyword wins, so specific conditions (emergencies, malaria) beat
//! generic symptoms, and greetings come last.

use std::sync::Arc;

use crate::models::Language;
use crate::rules::{self, RulesTable};

/// How a keyword is compared against the normalized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// Whole word, or a whole sequence of words.
    Word(String),
    /// Some word starts with it: `fever` matches `feverish`.
    Stem(String),
    /// Substring anywhere. Used for Devanagari and Odia terms.
    Fragment(String),
}

impl Keyword {
    fn is_found_in(&self, padded: &str) -> bool {
        match self {
            Keyword::Word(word) => padded.contains(&format!(" {} ", word)),
            Keyword::Stem(stem) => padded.contains(&format!(" {}", stem)),
            Keyword::Fragment(fragment) => padded.contains(fragment.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordGroup {
    pub topic_key: String,
    pub keywords: Vec<Keyword>,
}

impl KeywordGroup {
    pub fn new(topic_key: impl Into<String>) -> Self {
        Self {
            topic_key: topic_key.into(),
            keywords: Vec::new(),
        }
    }

    pub fn word(mut self, word: &str) -> Self {
        self.keywords.push(Keyword::Word(normalize_text(word)));
        self
    }

    pub fn stem(mut self, stem: &str) -> Self {
        self.keywords.push(Keyword::Stem(normalize_text(stem)));
        self
    }

    pub fn fragment(mut self, fragment: &str) -> Self {
        self.keywords.push(Keyword::Fragment(normalize_text(fragment)));
        self
    }

    /// First keyword of this group present in `padded`, in declaration order.
    pub fn first_match(&self, padded: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|keyword| keyword.is_found_in(padded))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackReply {
    pub topic_key: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct FallbackMatcher {
    groups: Vec<KeywordGroup>,
    rules: Arc<RulesTable>,
    default_topic: String,
}

impl FallbackMatcher {
    pub fn new(groups: Vec<KeywordGroup>, rules: Arc<RulesTable>) -> Self {
        Self {
            groups,
            rules,
            default_topic: rules::GENERAL_INFO.to_string(),
        }
    }

    pub fn builtin(rules: Arc<RulesTable>) -> Self {
        Self::new(builtin_groups(), rules)
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn rules(&self) -> &RulesTable {
        &self.rules
    }

    pub fn detect_topic(&self, message: &str) -> &str {
        let padded = format!(" {} ", normalize_text(message));
        self.groups
            .iter()
            .find(|group| group.first_match(&padded).is_some())
            .map(|group| group.topic_key.as_str())
            .unwrap_or(self.default_topic.as_str())
    }

    pub fn matches(&self, message: &str, language: Language) -> FallbackReply {
        let topic_key = self.detect_topic(message).to_string();
        let text = self.rules.lookup(&topic_key, language).to_string();
        FallbackReply { topic_key, text }
    }
}

/// Lowercase, fold Latin diacritics, drop zero-width joiners, turn punctuation into
/// spaces and collapse runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        match ch {
            '\u{200C}' | '\u{200D}' => {}
            // decomposed accents, so "fe\u{0301}ver" reads as "fever"
            '\u{0300}'..='\u{036F}' => {}
            // dandas end sentences
            '\u{0964}' | '\u{0965}' => cleaned.push(' '),
            c if is_indic(c) || c.is_alphanumeric() => cleaned.push(fold_latin(c)),
            _ => cleaned.push(' '),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Devanagari and Odia blocks, including viramas and nuktas which are not alphabetic
fn is_indic(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}' | '\u{0B00}'..='\u{0B7F}')
}

fn fold_latin(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'ē' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

pub fn builtin_groups() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup::new(rules::EMERGENCY)
            .stem("emergenc")
            .stem("ambulance")
            .stem("unconscious")
            .word("heavy bleeding")
            .word("snake bite")
            .stem("snakebite")
            .word("108")
            .fragment("आपातकाल")
            .fragment("एम्बुलेंस")
            .fragment("बेहोश")
            .fragment("ଜରୁରୀ")
            .fragment("ଆମ୍ବୁଲାନ୍ସ"),
        KeywordGroup::new(rules::VECTOR_BORNE_DISEASES)
            .stem("malaria")
            .stem("dengue")
            .stem("chikungunya")
            .stem("mosquito")
            .fragment("मलेरिया")
            .fragment("डेंगू")
            .fragment("मच्छर")
            .fragment("ମ୍ୟାଲେରିଆ")
            .fragment("ଡେଙ୍ଗୁ")
            .stem("ମଶା"),
        KeywordGroup::new(rules::FEVER_MANAGEMENT)
            .stem("fever")
            .stem("temperature")
            .word("bukhar")
            .word("jwor")
            .fragment("बुखार")
            .fragment("ज्वर")
            .fragment("ଜ୍ବର")
            .fragment("ଜ୍ୱର"),
        KeywordGroup::new(rules::HEADACHE)
            .stem("headache")
            .stem("migraine")
            .word("head pain")
            .fragment("सिरदर्द")
            .word("सिर दर्द")
            .fragment("ମୁଣ୍ଡ ବିନ୍ଧା")
            .fragment("ମାଥା ବଥା"),
        KeywordGroup::new(rules::COUGH_COLD)
            .stem("cough")
            .word("cold")
            .word("sore throat")
            .word("khansi")
            .fragment("खांसी")
            .fragment("जुकाम")
            .word("କାଶ")
            .word("ଥଣ୍ଡା"),
        KeywordGroup::new(rules::STOMACH_PAIN)
            .stem("stomach")
            .stem("abdom")
            .word("belly")
            .stem("diarrh")
            .stem("loose motion")
            .word("पेट")
            .fragment("दस्त")
            .word("ପେଟ")
            .word("ଝାଡ଼ା"),
        KeywordGroup::new(rules::MATERNAL_HEALTH)
            .stem("pregnan")
            .stem("maternal")
            .stem("prenatal")
            .stem("antenatal")
            .fragment("गर्भ")
            .fragment("ଗର୍ଭ"),
        KeywordGroup::new(rules::VACCINATION)
            .stem("vaccin")
            .stem("immuni")
            .word("tika")
            .fragment("टीका")
            .fragment("ଟୀକା"),
        KeywordGroup::new(rules::HYGIENE_SANITATION)
            .stem("hygien")
            .word("hand wash")
            .stem("handwash")
            .word("clean water")
            .stem("sanitation")
            .fragment("सफाई")
            .fragment("ସଫେଇ"),
        KeywordGroup::new(rules::GREETING)
            .word("hello")
            .word("hi")
            .word("hey")
            .word("namaste")
            .word("namaskar")
            .fragment("नमस्ते")
            .fragment("ନମସ୍କାର"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FallbackMatcher {
        FallbackMatcher::builtin(Arc::new(RulesTable::builtin()))
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  I have a FEVER!!  "), "i have a fever");
        assert_eq!(normalize_text("Café, naïve?"), "cafe naive");
        assert_eq!(normalize_text("मुझे बुखार है।"), "मुझे बुखार है");
        assert_eq!(normalize_text("ଜ୍\u{200D}ବର"), "ଜ୍ବର");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_text_drops_combining_marks() {
        assert_eq!(normalize_text("fe\u{0301}ver"), "fever");
        assert_eq!(normalize_text("Cafe\u{0301} nai\u{0308}ve"), "cafe naive");
        assert_eq!(
            matcher().detect_topic("I have a fe\u{0301}ver"),
            rules::FEVER_MANAGEMENT
        );
    }

    #[test]
    fn test_pinned_english_mappings() {
        let m = matcher();
        let cases = [
            ("I have a fever", rules::FEVER_MANAGEMENT),
            ("my child is feverish", rules::FEVER_MANAGEMENT),
            ("How to prevent malaria?", rules::VECTOR_BORNE_DISEASES),
            ("dengue fever symptoms", rules::VECTOR_BORNE_DISEASES),
            ("call an ambulance, he has a fever", rules::EMERGENCY),
            ("bad headache since morning", rules::HEADACHE),
            ("dry cough at night", rules::COUGH_COLD),
            ("stomach ache after lunch", rules::STOMACH_PAIN),
            ("loose motions since two days", rules::STOMACH_PAIN),
            ("I am pregnant, what should I eat", rules::MATERNAL_HEALTH),
            ("when is the next vaccine for my baby", rules::VACCINATION),
            ("why is handwashing important", rules::HYGIENE_SANITATION),
            ("hello", rules::GREETING),
            ("Hi there", rules::GREETING),
            ("tell me something", rules::GENERAL_INFO),
        ];
        for (message, topic) in cases {
            assert_eq!(m.detect_topic(message), topic, "message: {}", message);
        }
    }

    #[test]
    fn test_pinned_indic_mappings() {
        let m = matcher();
        assert_eq!(m.detect_topic("मुझे बुखार है"), rules::FEVER_MANAGEMENT);
        assert_eq!(m.detect_topic("मलेरिया से कैसे बचें"), rules::VECTOR_BORNE_DISEASES);
        assert_eq!(m.detect_topic("ମୋର ଜ୍ବର ଅଛି"), rules::FEVER_MANAGEMENT);
        assert_eq!(m.detect_topic("ଗର୍ଭାବସ୍ଥା ସମୟରେ କଣ ଖାଇବି"), rules::MATERNAL_HEALTH);
        assert_eq!(m.detect_topic("ନମସ୍କାର"), rules::GREETING);
    }

    #[test]
    fn test_short_words_need_word_boundaries() {
        let m = matcher();
        // "hi" inside "this" / "which" is not a greeting
        assert_eq!(m.detect_topic("which one is this"), rules::GENERAL_INFO);
        // "cold" must be a whole word
        assert_eq!(m.detect_topic("scolded by my boss"), rules::GENERAL_INFO);
        // Odia name containing କାଶ is not a cough
        assert_eq!(m.detect_topic("ପ୍ରକାଶ"), rules::GENERAL_INFO);
    }

    #[test]
    fn test_priority_order_wins_over_position_in_message() {
        let m = matcher();
        // greeting appears first in the text but fever has higher priority
        assert_eq!(m.detect_topic("hello, I have fever"), rules::FEVER_MANAGEMENT);
        assert_eq!(m.detect_topic("fever and cough"), rules::FEVER_MANAGEMENT);
    }

    #[test]
    fn test_matches_returns_language_text() {
        let m = matcher();
        let reply = m.matches("I have a fever", Language::En);
        assert_eq!(reply.topic_key, rules::FEVER_MANAGEMENT);
        assert!(reply.text.starts_with("For fever"));

        let reply = m.matches("cough", Language::Or);
        assert_eq!(reply.topic_key, rules::COUGH_COLD);
        assert_eq!(reply.text, m.rules().lookup(rules::COUGH_COLD, Language::En));
    }

    #[test]
    fn test_first_match_follows_declaration_order() {
        let group = KeywordGroup::new("t").stem("fev").word("fever");
        assert_eq!(
            group.first_match(" i have fever "),
            Some(&Keyword::Stem("fev".to_string()))
        );
    }
}
