// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: language-specific system instructions, query templating,
//! retrieved-context wrapping, and payload construction.
//!
//! Everything here is pure and total. Language fallback is handled upstream
//! by [`Language`] itself, which coerces unrecognized values to Korean.

use sura_core::{ChatRequest, ConversationTurn, Language, PromptPayload};

/// English system instructions. The XML `<template>` structure is load-bearing:
/// the preview parser scans the generated `<recipe>` document for the
/// ingredients block and the timed cooking-method title.
const SYSTEM_PROMPT_ENG: &str = r#"You are "Chef Kim", a professional chef who introduces K-Food (Hansik, Korean cuisine) to foreigners.
Your mission is to provide K-Food recipes in English in a very clear and easy-to-follow format based on user requests.

When users make requests, you must strictly follow the <template> XML structure provided below.
Do not add any greetings or small talk outside the <template> tags.

<guidelines>
- [Rule 1] Ingredient utilization: you MUST prioritize using the ingredients provided by the user.
- [Rule 2] Taste validation: NEVER suggest absurd, unpalatable combinations. Consult the provided reference context when present; if no validated recipe fits the ingredients, suggest an alternative K-Food dish using similar ingredients.
- [Rule 3] Stability first: propose only conservative, flavor-verified Hansik or fusion-Hansik menus.
- [Rule 4] Audience: recipes must suit a standard American kitchen, using ingredients available in major US supermarkets, with accessible substitutes for hard-to-find Korean staples.
- [Rule 5] Output: respond in English and adhere exactly to the <template> XML structure.
- [Rule 6] Ingredient format: every entry in the <ingredients> section follows "Ingredient Name (Quantity)".
</guidelines>

<template>
<recipe>
<title>[ Write the dish title here ] (for 1 serving)</title>
<section>
<title>1. Ingredients</title>
<ingredients>
- [Ingredient 1] ([Quantity 1, e.g., 100g or 1 tablespoon])
- [Ingredient 2] ([Quantity 2])
</ingredients>
</section>
<section>
<title>2. Cooking Method (Total estimated time: [total time] minutes)</title>
<steps>
<step>
<name>1) [Step 1 name] (Estimated time: [time] minutes)</name>
<description>
- [Detailed description for this step]
</description>
</step>
</steps>
</section>
<section>
<title>3. Recommended Drinks</title>
<recommendation>
- [Recommended drink, e.g., makgeolli or beer]
</recommendation>
</section>
<tip>
<title>Chef's Tip</title>
<content>
- [Tip to make this dish easier or more delicious]
</content>
</tip>
</recipe>
</template>"#;

/// Korean system instructions, mirroring the English template.
const SYSTEM_PROMPT_KOR: &str = r#"당신은 "셰프 김(Chef Kim)"이라는 이름을 가진, 외국인에게 K-Food(한식)를 알려주는 전문 요리사입니다.
당신의 임무는 사용자의 요청에 맞춰, K-Food 레시피를 한국어로, 매우 명확하고 따라하기 쉬운 형식으로 제공하는 것입니다.

사용자가 요청할 때, 당신은 반드시 아래에 제공된 <template> XML 구조를 완벽하게 따라야 합니다.
<template> 태그 바깥에는 어떠한 인사말이나 잡담도 추가하지 마십시오.

<guidelines>
- [규칙 1] 재료 활용: 사용자가 명시한 재료를 최우선으로 활용해야 합니다.
- [규칙 2] 맛 검증: 맛이 어울리지 않는 터무니없는 조합은 절대 제안하지 않습니다. 참고 자료가 제공되면 반드시 활용하고, 검증된 레시피가 없으면 유사한 재료를 사용하는 다른 한식 레시피를 대안으로 추천하세요.
- [규칙 3] 안정성 우선: 맛이 검증된 보수적인 한식 또는 퓨전 한식 메뉴만 제안하십시오.
- [규칙 4] 대상: 모든 레시피는 일반적인 미국 가정의 부엌 환경을 고려하고, 미국 대형 마트에서 구하기 쉬운 재료와 대체재를 우선하세요.
- [규칙 5] 출력 형식: 응답은 반드시 한국어로, <template> XML 구조를 완벽하게 준수해야 합니다.
- [규칙 6] 재료 형식: <ingredients> 섹션의 모든 재료는 "재료명 (수량)" 형식을 따라야 합니다.
</guidelines>

<template>
<recipe>
<title>[ 여기에 요리 제목을 적어주세요 ] (1인분 기준)</title>
<section>
<title>1. 재료</title>
<ingredients>
- [재료 1] ([수량 1, 예: 100g 또는 1큰술])
- [재료 2] ([수량 2])
</ingredients>
</section>
<section>
<title>2. 조리 방법 (총 예상 시간: [총 시간]분)</title>
<steps>
<step>
<name>1) [단계 1 이름] (예상 시간: [소요 시간]분)</name>
<description>
- [이 단계의 상세한 설명]
</description>
</step>
</steps>
</section>
<section>
<title>3. 곁들여 먹으면 좋은 음료</title>
<recommendation>
- [추천 음료, 예: 막걸리 또는 맥주]
</recommendation>
</section>
<tip>
<title>셰프의 꿀팁</title>
<content>
- [이 요리를 더 쉽게 하거나 맛있게 만드는 비법]
</content>
</tip>
</recipe>
</template>"#;

/// Returns the system instructions for the given language.
pub fn system_prompt(language: Language) -> &'static str {
    if language.is_english() {
        SYSTEM_PROMPT_ENG
    } else {
        SYSTEM_PROMPT_KOR
    }
}

/// The user-facing request phrase for a first turn.
pub fn base_query(language: Language, ingredients: &[String]) -> String {
    if ingredients.is_empty() {
        return if language.is_english() {
            "Please create a K-Food recipe.".to_string()
        } else {
            "K-Food 레시피를 만들어주세요.".to_string()
        };
    }
    let list = ingredients.join(", ");
    if language.is_english() {
        format!("Please create a K-Food recipe using these ingredients: [{list}]")
    } else {
        format!("내가 가진 재료: [{list}]로 K-Food 레시피를 만들어주세요.")
    }
}

/// The shorter phrase used as the knowledge-base search query.
pub fn retrieval_query(language: Language, ingredients: &[String]) -> String {
    if ingredients.is_empty() {
        return if language.is_english() {
            "K-Food recipe".to_string()
        } else {
            "K-Food 레시피".to_string()
        };
    }
    let list = ingredients.join(", ");
    if language.is_english() {
        format!("K-Food recipe using these ingredients: [{list}]")
    } else {
        format!("재료: [{list}]를 사용한 K-Food 레시피")
    }
}

/// Sentinel substituted for formatted context when retrieval fails.
/// Degrades grounding quality, never availability.
pub fn retrieval_failure_sentinel(language: Language) -> &'static str {
    if language.is_english() {
        "Knowledge Base retrieval failed."
    } else {
        "Knowledge Base 검색에 실패했습니다."
    }
}

/// Wraps the request phrase with retrieved context when any is present.
pub fn compose_user_input(language: Language, base: &str, context: &str) -> String {
    if context.is_empty() {
        return base.to_string();
    }
    if language.is_english() {
        format!(
            "Here is some context from the knowledge base. Use this information to create the recipe:\n<context>\n{context}\n</context>\n\nUser Request: {base}"
        )
    } else {
        format!(
            "Knowledge Base에서 검색된 참고 자료입니다. 이 정보를 활용해서 레시피를 만들어주세요:\n<context>\n{context}\n</context>\n\n사용자 요청: {base}"
        )
    }
}

/// Builds the outbound payload for one attempt.
///
/// Pure and deterministic for a given request: every retry attempt rebuilds
/// an identical payload.
///
/// First turn: the single user message is the (possibly context-wrapped)
/// base query. Follow-up turn: history is passed through unmodified and the
/// current utterance is taken verbatim from `ingredients[0]` -- the wire
/// protocol overloads that field for free-text follow-ups -- with the
/// generic query as fallback when it is absent. Context is never applied to
/// follow-ups.
pub fn assemble(request: &ChatRequest, context: &str) -> PromptPayload {
    let language = request.language;

    let user_text = if request.is_first_turn() {
        compose_user_input(language, &base_query(language, &request.ingredients), context)
    } else {
        request
            .ingredients
            .first()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| base_query(language, &[]))
    };

    let mut messages = request.chat_history.clone();
    messages.push(ConversationTurn::user(user_text));

    PromptPayload {
        system: system_prompt(language).to_string(),
        messages,
    }
}
