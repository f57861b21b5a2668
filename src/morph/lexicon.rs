//! Closed-class Russian words
//!
//! Prepositions, conjunctions, particles and interjections form small closed
//! sets, so they are recognized by lookup rather than by inflection rules.

use super::PartOfSpeech;

const PREPOSITIONS: &[&str] = &[
    "без", "безо", "близ", "в", "во", "вместо", "вне", "для", "до", "за", "из", "изо", "из-за",
    "из-под", "к", "ко", "кроме", "между", "меж", "на", "над", "надо", "о", "об", "обо", "от",
    "ото", "перед", "передо", "пред", "по", "под", "подо", "при", "про", "ради", "с", "со",
    "сквозь", "среди", "у", "через", "чрез", "около", "вокруг", "возле", "после", "против",
    "вдоль", "мимо", "внутри", "поперек", "насчет", "вследствие", "благодаря", "согласно",
    "вопреки", "навстречу", "сверх", "посреди", "ввиду", "вроде", "наподобие",
];

const CONJUNCTIONS: &[&str] = &[
    "и", "а", "но", "или", "либо", "да", "зато", "однако", "тоже", "также", "что", "чтобы",
    "чтоб", "если", "когда", "хотя", "хоть", "пока", "будто", "словно", "как", "ибо", "едва",
    "лишь", "только", "ни", "причем", "притом", "коли", "кабы", "дабы", "нежели", "чем",
];

const PARTICLES: &[&str] = &[
    "не", "ни", "бы", "б", "ли", "ль", "же", "ж", "вот", "вон", "даже", "уже", "еще", "ведь",
    "мол", "дескать", "де", "пусть", "пускай", "разве", "неужели", "ка", "то", "нибудь", "кое",
    "таки", "уж", "ну", "авось", "вряд", "аж",
];

const INTERJECTIONS: &[&str] = &[
    "ах", "ох", "эх", "ух", "ой", "ай", "ого", "ага", "угу", "увы", "ура", "браво", "алло",
    "ау", "эй", "фу", "тьфу", "ишь", "ну-ка", "ох-ох", "ей-богу", "ну-ну", "цыц", "брр", "хм",
    "ого-го", "ахти", "ай-ай-ай", "эге", "ба",
];

/// Part of speech of a closed-class word, if the word is one
pub fn closed_class(word: &str) -> Option<PartOfSpeech> {
    if PREPOSITIONS.contains(&word) {
        Some(PartOfSpeech::Preposition)
    } else if CONJUNCTIONS.contains(&word) {
        Some(PartOfSpeech::Conjunction)
    } else if PARTICLES.contains(&word) {
        Some(PartOfSpeech::Particle)
    } else if INTERJECTIONS.contains(&word) {
        Some(PartOfSpeech::Interjection)
    } else {
        None
    }
}
