//! Prompt template table
//!
//! The system instruction is assembled from a per-language template (role,
//! language-specific mechanical rules, shared formatting rules, output format).
//! The user instruction comes from a fixed table covering every
//! (language, difficulty) pair. Both lookups are exhaustive matches over the
//! closed enumerations, so there is no "missing template" case at runtime;
//! unrecognized raw preferences are resolved before they reach this module
//! (see [`PromptPair::for_preferences`]).

use shared::{DifficultyLevel, GenerationKey, KeyResolution, LanguageCode};

/// Per-language pieces of the system instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageTemplate {
    /// Who the model plays
    pub role: &'static str,
    /// Mechanical rules specific to the language (phonetic annotation policy)
    pub rules: &'static str,
    /// Shape of one generated sentence block
    pub format: &'static str,
}

/// Rules shared by every language. Output lands in Slack, so mrkdwn only.
pub const COMMON_RULES: &str = "인사말, 서론, 부연 설명 절대 금지. 문장과 형식만 출력해.\n\
이모지는 문장 번호(1️⃣ 2️⃣ 3️⃣)에만 사용. 그 외 이모지 금지\n\
Slack mrkdwn 포맷:\n   \
- 마크다운 헤더(#, ##), 코드블록(```) 사용 금지\n   \
- 굵게: *텍스트*\n";

const JAPANESE: LanguageTemplate = LanguageTemplate {
    role: "너는 일본어 학습을 돕는 선생님이야. 매일 학습할 수 있는 일본어 문장을 생성해줘.",
    rules: "1. 후리가나는 한자에만 붙여. 히라가나/카타카나에는 절대 붙이지 마. \
예: 食(た)べる ← 올바름, おはよう(おはよう) ← 이런 건 금지\n\
2. '읽기'에는 문장 전체를 영어 로마자(romaji)로 표기. 예: taberu, ohayou gozaimasu\n",
    format: "1️⃣ *日本語文장*\n읽기: ...\n번역: ...\n문법: ...\n\n━━━━━━━━━━\n\n",
};

const ENGLISH: LanguageTemplate = LanguageTemplate {
    role: "너는 영어 학습을 돕는 선생님이야. 매일 학습할 수 있는 영어 문장을 생성해줘.",
    rules: "1. 발음 가이드는 한글 표기로 제공. 예: pronunciation → 프로넌시에이션\n",
    format: "1️⃣ *English sentence*\n발음: ...\n번역: ...\n문법: ...\n\n━━━━━━━━━━\n\n",
};

const CHINESE: LanguageTemplate = LanguageTemplate {
    role: "너는 중국어 학습을 돕는 선생님이야. 매일 학습할 수 있는 중국어 문장을 생성해줘.",
    rules: "1. 모든 중국어 문장에 병음(pinyin)을 반드시 표기해줘. 예: 你好 (nǐ hǎo)\n",
    format: "1️⃣ *中文句子*\n병음: ...\n번역: ...\n문법: ...\n\n━━━━━━━━━━\n\n",
};

/// Template record for a language
pub fn language_template(language: LanguageCode) -> &'static LanguageTemplate {
    match language {
        LanguageCode::Japanese => &JAPANESE,
        LanguageCode::English => &ENGLISH,
        LanguageCode::Chinese => &CHINESE,
    }
}

/// Full system instruction for a language
pub fn system_instruction(language: LanguageCode) -> String {
    let template = language_template(language);
    format!(
        "{role}\n\n반드시 지켜야 할 규칙:\n{rules}{common}각 문장은 아래 형식으로만 작성:\n\n{format}",
        role = template.role,
        rules = template.rules,
        common = COMMON_RULES,
        format = template.format,
    )
}

/// User instruction for a (language, difficulty) pair
pub fn user_instruction(key: GenerationKey) -> &'static str {
    use DifficultyLevel::*;
    use LanguageCode::*;

    match (key.language, key.difficulty) {
        (Japanese, Low) => {
            "일본어 초급(JLPT N5) 수준의 짧은 일상 회화 문장 3개를 만들어줘. \
히라가나 위주로 작성하되, 한자가 있으면 후리가나와 로마자 발음을 함께 표기해줘. \
각 문장마다 한국어 번역과 핵심 문법 포인트를 함께 제공해줘."
        }
        (Japanese, Mid) => {
            "일본어 중급(JLPT N4~N3) 수준의 실용 문장 3개를 만들어줘. \
한자를 적절히 사용하고, 각 문장마다 후리가나, 로마자 발음, 한국어 번역, 문법 해설을 제공해줘."
        }
        (Japanese, High) => {
            "일본어 고급(JLPT N1~N2) 수준의 문장 3개를 만들어줘. \
비즈니스 또는 뉴스에서 사용하는 표현을 포함하고, \
각 문장마다 후리가나, 로마자 발음, 한국어 번역, 문법 해설을 제공해줘."
        }
        (English, Low) => {
            "영어 초급(초등 수준) 일상 회화 문장 3개를 만들어줘. \
쉬운 단어 위주로 작성하고, 한글 발음 가이드를 함께 표기해줘. \
각 문장마다 한국어 번역과 핵심 문법 포인트를 함께 제공해줘."
        }
        (English, Mid) => {
            "영어 중급(TOEIC 600~700) 수준의 실용 문장 3개를 만들어줘. \
각 문장마다 한글 발음 가이드, 한국어 번역, 문법 해설을 제공해줘."
        }
        (English, High) => {
            "영어 고급(TOEIC 800+) 수준의 문장 3개를 만들어줘. \
비즈니스 또는 뉴스에서 사용하는 표현을 포함하고, \
각 문장마다 한글 발음 가이드, 한국어 번역, 문법 해설을 제공해줘."
        }
        (Chinese, Low) => {
            "중국어 초급(HSK 1~2) 수준의 짧은 일상 회화 문장 3개를 만들어줘. \
간체자를 사용하고, 각 문장마다 병음(pinyin), 한국어 번역, 핵심 문법 포인트를 함께 제공해줘."
        }
        (Chinese, Mid) => {
            "중국어 중급(HSK 3~4) 수준의 실용 문장 3개를 만들어줘. \
각 문장마다 병음(pinyin), 한국어 번역, 문법 해설을 제공해줘."
        }
        (Chinese, High) => {
            "중국어 고급(HSK 5~6) 수준의 문장 3개를 만들어줘. \
비즈니스 또는 뉴스에서 사용하는 표현을 포함하고, \
각 문장마다 병음(pinyin), 한국어 번역, 문법 해설을 제공해줘."
        }
    }
}

/// The two prompts sent to the provider for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn for_key(key: GenerationKey) -> Self {
        Self {
            system: system_instruction(key.language),
            user: user_instruction(key).to_string(),
        }
    }

    /// Prompts for raw stored preferences. Unrecognized language falls back to
    /// the Japanese templates, unrecognized difficulty to that language's "mid"
    /// template. The resolution is returned so callers can report the substitution.
    pub fn for_preferences(language: Option<&str>, difficulty: Option<&str>) -> (Self, KeyResolution) {
        let resolution = GenerationKey::resolve(language, difficulty);
        (Self::for_key(resolution.key), resolution)
    }
}
