//! Candidate generation backends.
//!
//! Every source turns document text into [`Candidate`]s. The rest of the
//! pipeline only ever sees the candidates, never which source made them.

use std::collections::BTreeMap;
use std::fmt;

use layered_clinical::{Candidate, Span};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Clinical entity types produced by the built-in sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Disorder,
    Medication,
    Procedure,
    Anatomy,
    SignSymptom,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        Self::Disorder,
        Self::Medication,
        Self::Procedure,
        Self::Anatomy,
        Self::SignSymptom,
    ];

    /// The label used on candidates and entities.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disorder => "disorder",
            Self::Medication => "medication",
            Self::Procedure => "procedure",
            Self::Anatomy => "anatomy",
            Self::SignSymptom => "sign_symptom",
        }
    }

    /// Map a model label ("DISEASE", "Chemical", ...) onto an entity type.
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label {
            "DISEASE" | "Disease" | "DISORDER" => Some(Self::Disorder),
            "CHEMICAL" | "Chemical" | "MEDICATION" => Some(Self::Medication),
            "PROCEDURE" => Some(Self::Procedure),
            "ANATOMY" => Some(Self::Anatomy),
            "SIGN_SYMPTOM" => Some(Self::SignSymptom),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces candidates for a whole document.
pub trait CandidateSource: Send + Sync {
    /// Name recorded as the provenance of every candidate.
    fn name(&self) -> &str;

    fn candidates(&self, text: &str) -> Result<Vec<Candidate>, SourceError>;
}

const DISORDERS: &[&str] = &[
    "diabetes", "diabetes mellitus", "hypertension", "high blood pressure", "hyperlipidemia",
    "obesity", "depression", "anxiety", "asthma", "copd",
    "chronic obstructive pulmonary disease", "pneumonia", "myocardial infarction",
    "heart attack", "stroke", "cva", "cerebrovascular accident", "atrial fibrillation",
    "heart failure", "congestive heart failure", "chf", "angina", "chest pain",
    "shortness of breath", "dyspnea", "chronic kidney disease", "ckd", "renal failure",
    "kidney failure", "cirrhosis", "hepatitis", "gastroesophageal reflux", "gerd",
    "peptic ulcer", "inflammatory bowel disease", "ibd", "crohn's disease",
    "ulcerative colitis", "rheumatoid arthritis", "osteoarthritis", "osteoporosis",
    "fracture", "cancer", "carcinoma", "tumor", "neoplasm", "malignancy", "leukemia",
    "lymphoma", "melanoma", "alzheimer's disease", "dementia", "parkinson's disease",
    "multiple sclerosis", "epilepsy", "seizure", "migraine", "headache", "back pain",
    "arthritis", "fibromyalgia",
];

const MEDICATIONS: &[&str] = &[
    "metformin", "insulin", "lisinopril", "atorvastatin", "simvastatin", "amlodipine",
    "hydrochlorothiazide", "hctz", "losartan", "aspirin", "warfarin", "clopidogrel",
    "plavix", "omeprazole", "pantoprazole", "albuterol", "fluticasone", "prednisone",
    "ibuprofen", "acetaminophen", "tylenol", "morphine", "oxycodone", "hydrocodone",
    "tramadol", "gabapentin", "pregabalin", "sertraline", "citalopram", "escitalopram",
    "fluoxetine", "prozac", "zoloft", "lexapro", "trazodone", "alprazolam", "xanax",
    "lorazepam", "ativan", "clonazepam", "klonopin", "levothyroxine", "synthroid",
    "metoprolol", "carvedilol", "furosemide", "lasix", "spironolactone", "digoxin",
    "amiodarone", "diltiazem", "verapamil", "nitroglycerin", "isosorbide", "sildenafil",
    "viagra", "tadalafil", "cialis", "finasteride", "tamsulosin", "doxazosin", "terazosin",
    "ciprofloxacin", "levofloxacin", "amoxicillin", "azithromycin", "clarithromycin",
    "doxycycline", "cephalexin", "trimethoprim", "sulfamethoxazole", "bactrim",
];

const PROCEDURES: &[&str] = &[
    "appendectomy", "cholecystectomy", "colonoscopy", "endoscopy", "bronchoscopy",
    "cystoscopy", "arthroscopy", "laparoscopy", "thoracotomy", "craniotomy", "mastectomy",
    "hysterectomy", "prostatectomy", "nephrectomy", "splenectomy", "thyroidectomy",
    "tonsillectomy", "adenoidectomy", "cataract surgery", "coronary angioplasty",
    "cardiac catheterization", "pacemaker", "defibrillator", "stent", "bypass surgery",
    "cabg", "valve replacement", "transplant", "dialysis", "hemodialysis",
    "peritoneal dialysis", "chemotherapy", "radiation therapy", "surgery", "operation",
    "biopsy", "incision", "excision", "resection", "repair", "reconstruction",
    "implantation", "insertion", "removal", "drainage", "suture", "stapling",
];

const ANATOMY: &[&str] = &[
    "heart", "lung", "lungs", "liver", "kidney", "kidneys", "brain", "head", "neck", "chest",
    "abdomen", "pelvis", "back", "spine", "arm", "arms", "leg", "legs", "hand", "hands",
    "foot", "feet", "eye", "eyes", "ear", "ears", "nose", "mouth", "throat", "stomach",
    "intestine", "colon", "rectum", "bladder", "prostate", "uterus", "ovary", "ovaries",
    "breast", "breasts", "skin", "muscle", "muscles", "bone", "bones", "joint", "joints",
    "artery", "arteries", "vein", "veins", "blood vessel", "coronary artery", "aorta",
    "pulmonary artery", "carotid artery", "femoral artery", "renal artery",
    "hepatic artery", "splenic artery",
];

const SIGNS_SYMPTOMS: &[&str] = &[
    "fever", "pain", "nausea", "vomiting", "diarrhea", "constipation", "fatigue", "weakness",
    "dizziness", "headache", "cough", "shortness of breath", "dyspnea", "chest pain",
    "abdominal pain", "back pain", "joint pain", "muscle pain", "sore throat", "runny nose",
    "congestion", "sneezing", "rash", "itching", "swelling", "edema", "bruising", "bleeding",
    "weight loss", "weight gain", "loss of appetite", "increased appetite", "night sweats",
    "chills", "hot flashes", "palpitations", "irregular heartbeat", "high blood pressure",
    "low blood pressure", "rapid heart rate", "slow heart rate", "difficulty breathing",
    "wheezing", "hoarseness", "difficulty swallowing", "heartburn", "acid reflux",
    "bloating", "gas", "cramping", "urgency", "frequency", "burning", "numbness", "tingling",
    "stiffness",
];

fn default_terms(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Disorder => DISORDERS,
        EntityType::Medication => MEDICATIONS,
        EntityType::Procedure => PROCEDURES,
        EntityType::Anatomy => ANATOMY,
        EntityType::SignSymptom => SIGNS_SYMPTOMS,
    }
}

pub const DICTIONARY_CONFIDENCE: f64 = 0.85;
pub const DICTIONARY_PRIORITY: u32 = 1;
pub const MODEL_CONFIDENCE: f64 = 0.9;
pub const MODEL_PRIORITY: u32 = 2;

#[derive(Clone)]
struct DictionaryTerm {
    entity_type: EntityType,
    pattern: String,
    matcher: Regex,
}

/// Compiled once per process; [`DictionarySource::clinical`] clones it.
static CLINICAL_DICTIONARY: Lazy<DictionarySource> = Lazy::new(|| {
    let mut source = DictionarySource::new();
    for entity_type in EntityType::ALL {
        source.add_terms(entity_type, default_terms(entity_type).iter().copied());
    }
    source.rebuild_screen();
    source
});

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn at_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back().map_or(false, is_word_char);
    let after = text[end..].chars().next().map_or(false, is_word_char);
    !before && !after
}

/// Whole-word, case-insensitive lookup of clinical terms.
///
/// A [`RegexSet`] over every term screens each document first, so only the
/// terms that occur somewhere are searched for their positions.
#[derive(Clone)]
pub struct DictionarySource {
    terms: Vec<DictionaryTerm>,
    screen: Option<RegexSet>,
    confidence: f64,
    priority: u32,
}

impl fmt::Debug for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionarySource")
            .field("terms", &self.terms.len())
            .field("confidence", &self.confidence)
            .field("priority", &self.priority)
            .finish()
    }
}

impl DictionarySource {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            screen: None,
            confidence: DICTIONARY_CONFIDENCE,
            priority: DICTIONARY_PRIORITY,
        }
    }

    /// The built-in clinical term dictionary.
    pub fn clinical() -> Self {
        CLINICAL_DICTIONARY.clone()
    }

    /// Add terms of one entity type. Blank terms are ignored.
    pub fn with_terms<I, S>(mut self, entity_type: EntityType, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_terms(entity_type, terms);
        self.rebuild_screen();
        self
    }

    fn add_terms<I, S>(&mut self, entity_type: EntityType, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let words: Vec<String> = term.as_ref().split_whitespace().map(regex::escape).collect();
            if words.is_empty() {
                continue;
            }
            let pattern = words.join(r"\s+");
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(matcher) => self.terms.push(DictionaryTerm {
                    entity_type,
                    pattern,
                    matcher,
                }),
                Err(err) => tracing::warn!(%entity_type, %err, "skipping dictionary term"),
            }
        }
    }

    fn rebuild_screen(&mut self) {
        let patterns = self.terms.iter().map(|term| term.pattern.as_str());
        self.screen = match RegexSetBuilder::new(patterns).case_insensitive(true).build() {
            Ok(screen) => Some(screen),
            Err(err) => {
                tracing::warn!(%err, terms = self.terms.len(), "dictionary screen unavailable, searching every term");
                None
            }
        };
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for DictionarySource {
    fn default() -> Self {
        Self::clinical()
    }
}

impl CandidateSource for DictionarySource {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn candidates(&self, text: &str) -> Result<Vec<Candidate>, SourceError> {
        let hits: Vec<&DictionaryTerm> = match &self.screen {
            Some(screen) => screen
                .matches(text)
                .into_iter()
                .filter_map(|index| self.terms.get(index))
                .collect(),
            None => self.terms.iter().collect(),
        };

        let mut candidates = Vec::new();
        for term in hits {
            for found in term.matcher.find_iter(text) {
                if !at_word_boundaries(text, found.start(), found.end()) {
                    continue;
                }
                candidates.push(
                    Candidate::new(
                        Span::new(found.start(), found.end()),
                        term.entity_type.as_str(),
                        self.confidence,
                        self.priority,
                    )
                    .with_source(self.name()),
                );
            }
        }
        Ok(candidates)
    }
}

/// One labelled span returned by a model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub span: Span,
    /// Backend label, e.g. "DISEASE".
    pub label: String,
    /// Replaces the source's default confidence when present.
    #[serde(default)]
    pub score: Option<f64>,
}

/// A statistical tagger behind [`ExternalModelSource`].
pub trait ModelBackend: Send + Sync {
    fn predict(&self, text: &str) -> Result<Vec<Prediction>, String>;
}

impl<F> ModelBackend for F
where
    F: Fn(&str) -> Result<Vec<Prediction>, String> + Send + Sync,
{
    fn predict(&self, text: &str) -> Result<Vec<Prediction>, String> {
        self(text)
    }
}

/// Candidates from an external model, with labels mapped onto
/// [`EntityType`]s. Predictions with unknown labels are skipped.
pub struct ExternalModelSource {
    name: String,
    backend: Box<dyn ModelBackend>,
    label_overrides: BTreeMap<String, EntityType>,
    confidence: f64,
    priority: u32,
}

impl fmt::Debug for ExternalModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalModelSource")
            .field("name", &self.name)
            .field("label_overrides", &self.label_overrides)
            .field("confidence", &self.confidence)
            .field("priority", &self.priority)
            .finish()
    }
}

impl ExternalModelSource {
    pub fn new(name: impl Into<String>, backend: impl ModelBackend + 'static) -> Self {
        Self {
            name: name.into(),
            backend: Box::new(backend),
            label_overrides: BTreeMap::new(),
            confidence: MODEL_CONFIDENCE,
            priority: MODEL_PRIORITY,
        }
    }

    /// Map an additional backend label.
    pub fn with_label(mut self, label: impl Into<String>, entity_type: EntityType) -> Self {
        self.label_overrides.insert(label.into(), entity_type);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    fn entity_type(&self, label: &str) -> Option<EntityType> {
        self.label_overrides
            .get(label)
            .copied()
            .or_else(|| EntityType::from_model_label(label))
    }
}

impl CandidateSource for ExternalModelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self, text: &str) -> Result<Vec<Candidate>, SourceError> {
        let predictions = self.backend.predict(text).map_err(|message| SourceError {
            source_name: self.name.clone(),
            message,
        })?;

        let candidates = predictions
            .into_iter()
            .filter_map(|prediction| match self.entity_type(&prediction.label) {
                Some(entity_type) => Some(
                    Candidate::new(
                        prediction.span,
                        entity_type.as_str(),
                        prediction.score.unwrap_or(self.confidence),
                        self.priority,
                    )
                    .with_source(self.name.as_str()),
                ),
                None => {
                    tracing::debug!(label = %prediction.label, span = %prediction.span, "skipping unmapped model label");
                    None
                }
            })
            .collect();
        Ok(candidates)
    }
}
