// src/rules.rs
//! Canned multilingual health guidance, keyed by topic.
//!
//! The table is built once at startup and shared read-only. Lookups fall back
//! to English when the requested language has no entry for a topic, and to
//! [`NOT_AVAILABLE`] when English is missing too.

use std::collections::HashMap;

use crate::models::Language;

pub const EMERGENCY: &str = "emergency";
pub const VECTOR_BORNE_DISEASES: &str = "vector_borne_diseases";
pub const FEVER_MANAGEMENT: &str = "fever_management";
pub const HEADACHE: &str = "headache";
pub const COUGH_COLD: &str = "cough_cold";
pub const STOMACH_PAIN: &str = "stomach_pain";
pub const MATERNAL_HEALTH: &str = "maternal_health";
pub const VACCINATION: &str = "vaccination";
pub const HYGIENE_SANITATION: &str = "hygiene_sanitation";
pub const GREETING: &str = "greeting";
pub const GENERAL_INFO: &str = "general_info";

pub const NOT_AVAILABLE: &str =
    "Information on this topic is not available right now. Please contact your nearest health worker.";

#[derive(Debug, Clone)]
pub struct TopicRule {
    pub topic_key: String,
    responses: HashMap<Language, String>,
}

impl TopicRule {
    pub fn new(topic_key: impl Into<String>) -> Self {
        Self {
            topic_key: topic_key.into(),
            responses: HashMap::new(),
        }
    }

    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.responses.insert(language, text.into());
        self
    }

    pub fn text(&self, language: Language) -> Option<&str> {
        self.responses
            .get(&language)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct RulesTable {
    rules: HashMap<String, TopicRule>,
}

impl RulesTable {
    pub fn from_rules(rules: impl IntoIterator<Item = TopicRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.topic_key.clone(), rule))
                .collect(),
        }
    }

    pub fn get(&self, topic_key: &str) -> Option<&TopicRule> {
        self.rules.get(topic_key)
    }

    pub fn contains(&self, topic_key: &str) -> bool {
        self.rules.contains_key(topic_key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Requested language, then English, then the static "not available" text.
    pub fn lookup(&self, topic_key: &str, language: Language) -> &str {
        let Some(rule) = self.rules.get(topic_key) else {
            return NOT_AVAILABLE;
        };
        rule.text(language)
            .or_else(|| rule.text(Language::En))
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn builtin() -> Self {
        use Language::{En, Hi, Or};

        Self::from_rules([
            TopicRule::new(EMERGENCY)
                .with(En, "This may be a medical emergency. Call 108 for a free ambulance right away. Keep the person lying down, and do not give anything by mouth if they are unconscious. Go to the nearest health centre immediately.")
                .with(Hi, "यह एक चिकित्सा आपातकाल हो सकता है। तुरंत 108 पर मुफ्त एम्बुलेंस के लिए कॉल करें। व्यक्ति को लिटाकर रखें और बेहोश होने पर मुंह से कुछ न दें। तुरंत नज़दीकी स्वास्थ्य केंद्र जाएं।")
                .with(Or, "ଏହା ଏକ ଜରୁରୀକାଳୀନ ସ୍ଥିତି ହୋଇପାରେ। ତୁରନ୍ତ 108 ରେ ମାଗଣା ଆମ୍ବୁଲାନ୍ସ ପାଇଁ ଫୋନ କରନ୍ତୁ ଏବଂ ନିକଟତମ ସ୍ୱାସ୍ଥ୍ୟ କେନ୍ଦ୍ରକୁ ଯାଆନ୍ତୁ।"),
            TopicRule::new(VECTOR_BORNE_DISEASES)
                .with(En, "To prevent malaria and dengue: sleep under an insecticide-treated mosquito net, remove standing water around your home every week, wear full-sleeved clothes and use mosquito repellent. If you have fever with chills, get a free blood test at the nearest health centre or from your ASHA worker.")
                .with(Hi, "मलेरिया और डेंगू से बचाव के लिए: कीटनाशक युक्त मच्छरदानी में सोएं, हर सप्ताह घर के आसपास जमा पानी हटाएं, पूरी बाजू के कपड़े पहनें और मच्छर भगाने वाली दवा का उपयोग करें। ठंड लगकर बुखार हो तो नज़दीकी स्वास्थ्य केंद्र या आशा कार्यकर्ता से मुफ्त खून की जांच कराएं।")
                .with(Or, "ମ୍ୟାଲେରିଆ ଓ ଡେଙ୍ଗୁରୁ ରକ୍ଷା ପାଇଁ: ଔଷଧଯୁକ୍ତ ମଶାରି ଭିତରେ ଶୁଅନ୍ତୁ, ପ୍ରତି ସପ୍ତାହ ଘର ଚାରିପଟେ ଜମା ପାଣି ହଟାନ୍ତୁ, ପୂରା ହାତ ଲୁଗା ପିନ୍ଧନ୍ତୁ। ଥଣ୍ଡା ଲାଗି ଜ୍ୱର ହେଲେ ନିକଟତମ ସ୍ୱାସ୍ଥ୍ୟ କେନ୍ଦ୍ର କିମ୍ବା ଆଶା କର୍ମୀଙ୍କ ଠାରୁ ମାଗଣା ରକ୍ତ ପରୀକ୍ଷା କରାନ୍ତୁ।"),
            TopicRule::new(FEVER_MANAGEMENT)
                .with(En, "For fever: Take adequate rest, stay hydrated with plenty of fluids, use cool compresses. If fever exceeds 102°F or persists for more than 3 days, consult a doctor immediately.")
                .with(Hi, "बुखार के लिए: पर्याप्त आराम लें, पानी और तरल पदार्थों से हाइड्रेटेड रहें, ठंडी पट्टी का उपयोग करें। यदि बुखार 102°F से अधिक हो या 3 दिनों से अधिक बना रहे तो तुरंत डॉक्टर से संपर्क करें।")
                .with(Or, "ଜ୍ବର ପାଇଁ: ଯଥେଷ୍ଟ ବିଶ୍ରାମ ନିଅନ୍ତୁ, ପାଣି ଏବଂ ତରଳ ପଦାର୍ଥ ପିଅନ୍ତୁ, ଥଣ୍ଡା ସେକ ବ୍ୟବହାର କରନ୍ତୁ। ଯଦି ଜ୍ବର 102°F ରୁ ଅଧିକ ହୁଏ କିମ୍ବା 3 ଦିନରୁ ଅଧିକ ରହେ ତେବେ ତୁରନ୍ତ ଡାକ୍ତରଙ୍କ ସହିତ ଯୋଗାଯୋଗ କରନ୍ତୁ।"),
            TopicRule::new(HEADACHE)
                .with(En, "For headache: Rest in a quiet, dark room. Apply cold or warm compress to head or neck. Stay hydrated. If severe or persistent, consult a healthcare provider.")
                .with(Hi, "सिरदर्द के लिए: शांत, अंधेरे कमरे में आराम करें। सिर या गर्दन पर ठंडी या गर्म पट्टी लगाएं। हाइड्रेटेड रहें। यदि गंभीर या लगातार हो तो स्वास्थ्य सेवा प्रदाता से सलाह लें।")
                .with(Or, "ମାଥା ବଥା ପାଇଁ: ଶାନ୍ତ, ଅନ୍ଧାର କୋଠରୀରେ ବିଶ୍ରାମ ନିଅନ୍ତୁ। ମୁଣ୍ଡ କିମ୍ବା ବେକରେ ଥଣ୍ଡା କିମ୍ବା ଗରମ ସେକ ଲଗାନ୍ତୁ। ହାଇଡ୍ରେଟେଡ୍ ରୁହନ୍ତୁ।"),
            // No Odia text yet, Odia requests get the English guidance
            TopicRule::new(COUGH_COLD)
                .with(En, "For cough and cold: drink warm fluids, inhale steam, gargle with warm salt water and rest. Cover your mouth when coughing. If the cough lasts more than 2 weeks or you have difficulty breathing, visit a health centre; a cough of over 2 weeks should be tested for TB.")
                .with(Hi, "खांसी और जुकाम के लिए: गर्म तरल पदार्थ पिएं, भाप लें, गुनगुने नमक के पानी से गरारे करें और आराम करें। खांसते समय मुंह ढकें। यदि खांसी 2 सप्ताह से अधिक रहे या सांस लेने में कठिनाई हो तो स्वास्थ्य केंद्र जाएं।"),
            TopicRule::new(STOMACH_PAIN)
                .with(En, "For stomach pain or diarrhoea: drink ORS (oral rehydration solution) after every loose stool, keep eating light food, drink only boiled or purified water, and wash hands with soap. Seek care quickly if there is blood in the stool, severe pain, or signs of dehydration.")
                .with(Hi, "पेट दर्द या दस्त के लिए: हर पतले दस्त के बाद ओआरएस (ORS) घोल पिएं, हल्का भोजन करते रहें, केवल उबला या साफ पानी पिएं और साबुन से हाथ धोएं। मल में खून, तेज दर्द या पानी की कमी के लक्षण हों तो तुरंत इलाज कराएं।")
                .with(Or, "ପେଟ ବ୍ୟଥା କିମ୍ବା ଝାଡ଼ା ପାଇଁ: ପ୍ରତି ଥର ପତଳା ଝାଡ଼ା ପରେ ORS ପାଣି ପିଅନ୍ତୁ, ହାଲୁକା ଖାଦ୍ୟ ଖାଆନ୍ତୁ, କେବଳ ଫୁଟା ପାଣି ପିଅନ୍ତୁ ଏବଂ ସାବୁନରେ ହାତ ଧୁଅନ୍ତୁ। ଝାଡ଼ାରେ ରକ୍ତ କିମ୍ବା ଅଧିକ ଯନ୍ତ୍ରଣା ହେଲେ ତୁରନ୍ତ ଚିକିତ୍ସା କରାନ୍ତୁ।"),
            TopicRule::new(MATERNAL_HEALTH)
                .with(En, "During pregnancy: register early at your nearest health centre, attend at least four antenatal check-ups, take iron and folic acid tablets daily, eat nutritious food and rest well. Deliver at a health facility and call 102 for free transport. See a doctor at once for bleeding, severe headache or swelling.")
                .with(Hi, "गर्भावस्था के दौरान: नज़दीकी स्वास्थ्य केंद्र में जल्दी पंजीकरण कराएं, कम से कम चार प्रसवपूर्व जांच कराएं, रोज़ आयरन और फोलिक एसिड की गोली लें, पौष्टिक भोजन करें और आराम करें। प्रसव स्वास्थ्य केंद्र में कराएं और मुफ्त वाहन के लिए 102 पर कॉल करें।")
                .with(Or, "ଗର୍ଭାବସ୍ଥା ସମୟରେ: ନିକଟତମ ସ୍ୱାସ୍ଥ୍ୟ କେନ୍ଦ୍ରରେ ଶୀଘ୍ର ପଞ୍ଜୀକରଣ କରନ୍ତୁ, ଅତି କମରେ ଚାରିଥର ଗର୍ଭକାଳୀନ ଯାଞ୍ଚ କରାନ୍ତୁ, ପ୍ରତିଦିନ ଆଇରନ ଓ ଫୋଲିକ ଏସିଡ ବଟିକା ଖାଆନ୍ତୁ। ପ୍ରସବ ସ୍ୱାସ୍ଥ୍ୟ କେନ୍ଦ୍ରରେ କରାନ୍ତୁ ଏବଂ ମାଗଣା ଗାଡ଼ି ପାଇଁ 102 ରେ ଫୋନ କରନ୍ତୁ।"),
            TopicRule::new(VACCINATION)
                .with(En, "Vaccines are free at government health centres and Anganwadi sessions. Follow the national immunization schedule: BCG, OPV and Hepatitis B at birth, Pentavalent, Rotavirus and other doses at 6, 10 and 14 weeks, and Measles-Rubella at 9 months. Keep the vaccination card safe.")
                .with(Hi, "सरकारी स्वास्थ्य केंद्रों और आंगनवाड़ी सत्रों में टीके मुफ्त लगते हैं। राष्ट्रीय टीकाकरण सूची का पालन करें: जन्म पर बीसीजी, पोलियो और हेपेटाइटिस बी, फिर 6, 10 और 14 सप्ताह पर पेंटावैलेंट व अन्य टीके, और 9 महीने पर खसरा-रूबेला। टीकाकरण कार्ड संभालकर रखें।")
                .with(Or, "ସରକାରୀ ସ୍ୱାସ୍ଥ୍ୟ କେନ୍ଦ୍ର ଓ ଅଙ୍ଗନୱାଡ଼ି ଅଧିବେଶନରେ ଟୀକା ମାଗଣାରେ ଦିଆଯାଏ। ଜାତୀୟ ଟୀକାକରଣ ସୂଚୀ ଅନୁସରଣ କରନ୍ତୁ ଏବଂ ଟୀକାକରଣ କାର୍ଡ ସୁରକ୍ଷିତ ରଖନ୍ତୁ।"),
            TopicRule::new(HYGIENE_SANITATION)
                .with(En, "Wash hands with soap before eating and after using the toilet, drink boiled or filtered water, keep food covered and use a toilet instead of open defecation. These steps prevent diarrhoea, typhoid and worm infections.")
                .with(Hi, "खाने से पहले और शौच के बाद साबुन से हाथ धोएं, उबला या छना हुआ पानी पिएं, भोजन ढककर रखें और खुले में शौच के बजाय शौचालय का उपयोग करें। इससे दस्त, टाइफाइड और कृमि संक्रमण से बचाव होता है।"),
            TopicRule::new(GREETING)
                .with(En, "Namaste! I am Ama Arogya, your health assistant. Ask me about fever, malaria, pregnancy care, vaccination or other common health problems.")
                .with(Hi, "नमस्ते! मैं आमा आरोग्य, आपका स्वास्थ्य सहायक हूँ। मुझसे बुखार, मलेरिया, गर्भावस्था देखभाल, टीकाकरण या अन्य सामान्य स्वास्थ्य समस्याओं के बारे में पूछें।")
                .with(Or, "ନମସ୍କାର! ମୁଁ ଆମ ଆରୋଗ୍ୟ, ଆପଣଙ୍କ ସ୍ୱାସ୍ଥ୍ୟ ସହାୟକ। ଜ୍ୱର, ମ୍ୟାଲେରିଆ, ଗର୍ଭାବସ୍ଥା ଯତ୍ନ, ଟୀକାକରଣ କିମ୍ବା ଅନ୍ୟ ସାଧାରଣ ସ୍ୱାସ୍ଥ୍ୟ ସମସ୍ୟା ବିଷୟରେ ପଚାରନ୍ତୁ।"),
            TopicRule::new(GENERAL_INFO)
                .with(En, "I'm here to help with health-related questions. Please describe your symptoms or ask about health topics like vaccination, pregnancy care, or common illnesses.")
                .with(Hi, "मैं स्वास्थ्य संबंधी प्रश्नों में मदद के लिए यहाँ हूँ। कृपया अपने लक्षणों का वर्णन करें या टीकाकरण, गर्भावस्था देखभाल, या सामान्य बीमारियों के बारे में पूछें।")
                .with(Or, "ମୁଁ ସ୍ୱାସ୍ଥ୍ୟ ସମ୍ବନ୍ଧୀୟ ପ୍ରଶ୍ନରେ ସାହାଯ୍ୟ ପାଇଁ ଏଠାରେ ଅଛି। ଦୟାକରି ଆପଣଙ୍କର ଲକ୍ଷଣ ବର୍ଣ୍ଣନା କରନ୍ତୁ କିମ୍ବା ଟୀକାକରଣ, ଗର୍ଭାବସ୍ଥା ଯତ୍ନ, କିମ୍ବା ସାଧାରଣ ରୋଗ ବିଷୟରେ ପଚାରନ୍ତୁ।"),
        ])
    }
}

impl Default for RulesTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_topic_in_english() {
        let table = RulesTable::builtin();
        for topic in [
            EMERGENCY,
            VECTOR_BORNE_DISEASES,
            FEVER_MANAGEMENT,
            HEADACHE,
            COUGH_COLD,
            STOMACH_PAIN,
            MATERNAL_HEALTH,
            VACCINATION,
            HYGIENE_SANITATION,
            GREETING,
            GENERAL_INFO,
        ] {
            let rule = table.get(topic).expect(topic);
            assert!(rule.text(Language::En).is_some(), "{} has no English text", topic);
        }
        assert_eq!(table.len(), 11);
    }

    #[test]
    fn test_missing_odia_falls_back_to_english() {
        let table = RulesTable::builtin();
        let english = table.lookup(COUGH_COLD, Language::En);
        let odia = table.lookup(COUGH_COLD, Language::Or);
        assert!(!odia.is_empty());
        assert_eq!(odia, english);
    }

    #[test]
    fn test_present_language_is_preferred() {
        let table = RulesTable::builtin();
        let hindi = table.lookup(FEVER_MANAGEMENT, Language::Hi);
        assert!(hindi.starts_with("बुखार"));
        assert_ne!(hindi, table.lookup(FEVER_MANAGEMENT, Language::En));
    }

    #[test]
    fn test_not_available_when_english_missing() {
        let table = RulesTable::from_rules([
            TopicRule::new("odia_only").with(Language::Or, "କେବଳ ଓଡ଼ିଆ"),
            TopicRule::new("blank").with(Language::En, "   "),
        ]);
        assert_eq!(table.lookup("odia_only", Language::Hi), NOT_AVAILABLE);
        assert_eq!(table.lookup("odia_only", Language::Or), "କେବଳ ଓଡ଼ିଆ");
        assert_eq!(table.lookup("blank", Language::En), NOT_AVAILABLE);
        assert_eq!(table.lookup("unknown_topic", Language::En), NOT_AVAILABLE);
    }
}
