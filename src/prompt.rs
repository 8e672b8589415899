//! Renders the analysis request sent to the generation service.

use crate::saju::ganzhi::{year_pillar, SexagenaryTerm};
use crate::saju::types::BirthRecord;
use chrono::{Datelike, NaiveDate};

const NOT_PROVIDED: &str = "미입력";

/// Fully rendered prompt. Moved into the generation call, which consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(String);

impl AnalysisPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Colour and animal of the target year for the outlook line. The fire
/// horse year keeps its traditional name.
fn year_spirit(year: SexagenaryTerm) -> String {
    match year.hangul().as_str() {
        "병오" => "붉은 말(적토마)".to_string(),
        _ => format!("{} {}", year.element().color(), year.animal()),
    }
}

/// Builds the three-part request: natal chart, name analysis, and the
/// outlook for `target_year`.
pub fn render(
    record: &BirthRecord,
    solar: NaiveDate,
    pillar: SexagenaryTerm,
    target_year: i32,
) -> AnalysisPrompt {
    let name = &record.hangul_name;
    let ilju = pillar.hangul();
    let ilju_hanja = pillar.hanja();
    let gender = record.gender.label();
    let entered = record.entered_date();
    let calendar = record.calendar.label();
    let (s_year, s_month, s_day) = (solar.year(), solar.month(), solar.day());
    let time = &record.time;

    let year = year_pillar(target_year);
    let year_hangul = year.hangul();
    let year_hanja = year.hanja();
    let stem_hanja: String = year_hanja.chars().take(1).collect();
    let branch_hanja: String = year_hanja.chars().skip(1).collect();
    let spirit = year_spirit(year);
    let element = year.element().label();

    let hanja_name = record.hanja_name.as_deref().unwrap_or(NOT_PROVIDED);
    let hanja_line = match &record.hanja_name {
        Some(hanja) => format!(
            "* 한자 이름 '{hanja}'의 **자원 오행**이 1단계에서 분석한 용신(필요한 기운)과 일치하는지 평가하세요."
        ),
        None => format!(
            "* 한자 이름은 {NOT_PROVIDED}입니다. 자원 오행 평가는 생략하고 발음 오행 중심으로 판단하세요."
        ),
    };

    AnalysisPrompt(format!(
        r#"당신은 대한민국 최고의 명리학자이자 성명학 전문가입니다.
아래 팩트(Facts)를 바탕으로 사주와 이름의 조화를 분석하고 {target_year}년 운세를 '심층 분석'하세요.

[1. 사용자 기본 정보]
- 이름: {name} (한자: {hanja_name})
- 성별: {gender}
- 생년월일: {entered} ({calendar}) -> 양력 변환: {s_year}년 {s_month}월 {s_day}일
- 태어난 시간: {time}
- **[핵심 팩트] 계산된 일주(Day Pillar)**: {ilju} ({ilju_hanja}) (이 값은 절대적 기준입니다.)

[2. 분석 요청 사항 - 상세히 작성할 것]
다음 3단계로 나누어 명확하고 통찰력 있게 답변해 주세요. 마크다운 형식을 사용하여 가독성을 높이세요.

## 1단계: 사주 원국과 대운 분석 (선천운 정밀 진단)
1. **사주팔자(四柱八字) 구성**:
   - 연주, 월주, 일주(확정값: {ilju}), 시주를 표나 리스트로 정리하세요.
   - **중요**: 각 기둥의 천간/지지가 내 일간(나)에게 어떤 **십신(비견, 겁재, 식신, 상관, 편재, 정재, 편관, 정관, 편인, 정인)**에 해당하는지 반드시 함께 표기하세요.
2. **오행 분석**:
   - 목, 화, 토, 금, 수의 분포를 파악하고 **과다한 오행**과 **결핍된 오행**을 지적하세요.
   - 이에 따른 기질적 특징(성격)을 설명하세요.
3. **대운(大運)의 흐름**:
   - 현재 대운(10년 운)이 나에게 유리한 흐름(용신/희신운)인지, 불리한 흐름(기신운)인지 분석하세요.

## 2단계: 성명학 분석 (이름의 보완력)
* 이름 '{name}'의 **발음 오행**이 사주의 부족한 기운을 채워주고 있는지 분석하세요.
{hanja_line}
* 결론적으로 이 이름이 개운(운을 좋게 함)에 도움이 되는지 판단하세요.

## 3단계: {target_year}년 {year_hangul}년({year_hanja}年) 심층 운세
*{target_year}년의 {spirit}의 기운이 내 사주와 만났을 때를 예측합니다.*

1. **운세 총론**: {target_year}년 {year_hangul}년의 천간({stem_hanja})과 지지({branch_hanja})가 내 사주 원국과 맺는 **합(合)·충(沖)·형(刑)** 관계를 분석하여 한 문장으로 요약하세요.
2. **테마별 상세 운세**:
   - **💰 재물운**: 돈의 흐름, 투자 적기, 손실 위험, 횡재수 여부
   - **🏢 직업/사업운**: 승진, 이직, 창업, 관재구설(소송/다툼) 가능성
   - **❤️ 애정/대인관계**: 연애운, 결혼운, 부부 관계, 귀인의 등장 여부
   - **💪 건강운**: {element} 기운의 태과/부족에 따른 주의할 신체 부위 및 관리법
3. **월별 흐름 팁**: {target_year}년 중 가장 운이 좋은 시기(달)와 조심해야 할 시기를 구체적으로 짚어주세요.
"#
    ))
}
