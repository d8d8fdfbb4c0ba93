//! Advisor prompt templates.
//!
//! Each function renders one prompt from value objects. Rendering is pure and
//! cannot fail; numbers are printed the way users typed them (`12.5`, `100`).

use crate::config::ResponseFormat;
use crate::constants::field as field_constants;
use crate::types::{
    FieldProfile, HerdProfile, InventoryLine, RecommendationCategory, format_quantity,
    group_thousands, parse_date,
};

use super::PromptBuilder;

const AGRONOMIST: &str = "казахстанский агроном";
const ZOOTECHNICIAN: &str = "казахстанский ветеринар-зоотехник";

const FEEDING_PLAN_SCHEMA: &str = r#"{
  "summary": "Краткая сводка плана кормления",
  "dailyFeed": [
    {
      "ingredient": "название корма",
      "perAnimalKg": число_кг_на_1_голову_в_день,
      "percentage": процент_в_рационе,
      "costPerKg": цена_за_кг_в_тенге_или_null
    }
  ],
  "feedingSchedule": ["правило 1", "правило 2", "правило 3"],
  "nutritionTips": ["совет 1", "совет 2"],
  "costSavings": ["экономия 1 с ценами в ₸", "экономия 2"]
}"#;

const FERTILIZER_SCHEMA: &str = r#"{
  "summary": "Краткая оценка плана внесения удобрений",
  "effectiveness": ["оценка 1 с цифрами", "оценка 2"],
  "costOptimization": ["совет по экономии с ценами в ₸/га", "совет 2"],
  "warnings": ["предупреждение 1", "предупреждение 2"],
  "suggestions": ["рекомендация 1 с количеством кг/га", "рекомендация 2"]
}"#;

const JSON_ONLY: &str = "ОБЯЗАТЕЛЬНО верни ответ ТОЛЬКО в формате JSON (без дополнительного текста)";

const SOCRATIC_METHOD: &str = r#"ВАШ ПОДХОД - СОКРАТИЧЕСКИЙ МЕТОД (через наводящие вопросы):

1. ЗАДАВАЙТЕ НАВОДЯЩИЕ ВОПРОСЫ:
   - Сначала спросите о конкретных деталях ситуации
   - Уточните цели и ограничения
   - Помогите пользователю самому прийти к выводам

2. СТРУКТУРА ОТВЕТА:
   - Начните с 2-3 уточняющих вопросов
   - Дайте краткие рекомендации (3-5 пунктов)
   - Завершите вопросом для размышления

3. ПРИМЕРЫ ХОРОШИХ ВОПРОСОВ:
   - "Какой у вас бюджет на эти работы?"
   - "Когда планируете начать? Какие сроки?"
   - "Какие проблемы у вас были в прошлом сезоне?"
   - "Какую урожайность хотите получить?"
   - "Есть ли у вас техника для этого?"

4. СТИЛЬ ОБЩЕНИЯ:
   - Краткие, практичные ответы
   - Каждый пункт - 1 предложение
   - Без лишней теории
   - Максимум 5-7 пунктов на ответ

Пример хорошего ответа:
"Перед тем как дать рекомендации по удобрениям, уточните:
- Какой анализ почвы у вас есть?
- Когда последний раз вносили удобрения?
- Какой бюджет на га планируете?

Базовые рекомендации:
1. Закажите анализ почвы (NPK)
2. Внесите азот 40-60 кг/га весной
3. Фосфор и калий - осенью

Что для вас важнее - максимальный урожай или экономия затрат?"

Отвечайте на русском языке."#;

/// Renders every prompt the advisor sends.
pub struct AdvisorPrompts;

impl AdvisorPrompts {
    /// Yield forecast, priced actions, priced risks and a seasonal timeline.
    pub fn field_analysis(field: &FieldProfile) -> String {
        let example_total = (field.area * field_constants::EXAMPLE_COST_PER_HA).round() as i64;
        let example = format!(
            "\"Внести азот 60 кг/га в марте-апреле → стоимость 8,000₸/га (всего {}₸) → +20% урожая (+0.5 т/га) → прибыль +50,000₸/га. АЛЬТЕРНАТИВА: Местная аммиачная селитра 5,500₸/га (-30% цена)\"",
            group_thousands(example_total)
        );

        PromptBuilder::new()
            .role(
                AGRONOMIST,
                "Дай ПРАКТИЧНЫЕ, ЭКОНОМНЫЕ рекомендации с РЕАЛЬНЫМИ ценами в тенге (₸).",
            )
            .context_item("Поле", &field.name)
            .context_item("Культура", &field.crop_type)
            .context_item("Площадь", format!("{} га", format_quantity(field.area)))
            .context_item(
                "Координаты",
                format!("{}, {} (Казахстан)", field.latitude, field.longitude),
            )
            .bullets(
                "ОБЯЗАТЕЛЬНО для каждой рекомендации указывай",
                vec![
                    "Стоимость в ₸/га и общие затраты".to_string(),
                    "Ожидаемый прирост урожая в тоннах".to_string(),
                    "ROI (возврат инвестиций) в процентах".to_string(),
                    "Дешевую альтернативу (если есть)".to_string(),
                ],
            )
            .numbered(
                "Формат ответа (КРАТКО, по пунктам)",
                vec![
                    "Прогноз урожайности: X тонн/га, потенциал: Y тонн/га (+Z%)",
                    &format!("3-5 КОНКРЕТНЫХ действий с ценами: {}", example),
                    "2-3 риска с потерями: \"Град в июне → минус 30% урожая (потеря 200,000₸)\"",
                    "График: \"Март: посев. Апрель: азот. Май: гербициды. Июль: полив. Сентябрь: уборка\"",
                ],
            )
            .rules(vec![
                "ВСЕ цифры и цены ОБЯЗАТЕЛЬНЫ!".to_string(),
                "Каждый пункт - ОДНО предложение.".to_string(),
            ])
            .build()
    }

    /// Daily ration for a livestock group, as a JSON object or as
    /// `"Ingredient: NN%"` lines.
    pub fn feeding_plan(herd: &HerdProfile, format: ResponseFormat) -> String {
        let builder = PromptBuilder::new()
            .role(
                ZOOTECHNICIAN,
                "Составь ЭКОНОМНЫЙ и ЭФФЕКТИВНЫЙ план кормления.",
            )
            .context_item("Животные", format!("{} голов {}", herd.count, herd.kind));

        match format {
            ResponseFormat::Json => builder
                .text(format!("{}:", JSON_ONLY))
                .code("json", FEEDING_PLAN_SCHEMA)
                .rules(vec![
                    format!("Укажи РЕАЛЬНЫЕ количества для типа животного \"{}\"", herd.kind),
                    "perAnimalKg должен быть конкретным числом (например: 4.5, 3.2, 1.8)"
                        .to_string(),
                    format!("Общее количество корма = perAnimalKg * {}", herd.count),
                    "НЕ используй проценты для количества, только для состава рациона".to_string(),
                    "Цены в тенге (₸), местные казахстанские корма".to_string(),
                    "5-7 ингредиентов в рационе".to_string(),
                ])
                .build(),
            ResponseFormat::Text => builder
                .numbered(
                    "Формат ответа (КРАТКО, каждый пункт с новой строки)",
                    vec![
                        "Состав рациона: каждая строка строго в виде \"Ингредиент: NN%\", 5-7 ингредиентов, сумма 100%",
                        "Количество в кг на 1 голову в день для каждого ингредиента",
                        "График кормления: сколько раз в день и в какое время",
                        "Советы по питанию: витамины, минералы, вода",
                        "Экономия: как снизить затраты, с ценами в ₸",
                    ],
                )
                .rules(vec![
                    "Цены в тенге (₸), местные казахстанские корма".to_string(),
                    "Каждый пункт - ОДНО короткое предложение.".to_string(),
                ])
                .build(),
        }
    }

    /// Four or five short points for one recommendation category.
    pub fn category(field: &FieldProfile, category: RecommendationCategory) -> String {
        PromptBuilder::new()
            .text(format!(
                "Дай КРАТКИЕ рекомендации по категории \"{}\" для поля:",
                category.title()
            ))
            .context_item("Культура", &field.crop_type)
            .context_item("Площадь", format!("{} га", format_quantity(field.area)))
            .text(
                "Дай 4-5 конкретных пунктов. Каждый пункт - 1 короткое предложение.\n\
                 Без длинных объяснений, только суть.",
            )
            .build()
    }

    /// Critique of the feeds a user entered for one livestock group.
    pub fn feed_analysis(herd: &HerdProfile, feeds: &[InventoryLine]) -> String {
        PromptBuilder::new()
            .role(
                ZOOTECHNICIAN,
                "ПРОАНАЛИЗИРУЙ текущий рацион кормления и дай ПРАКТИЧНЫЕ советы.",
            )
            .context_item("Животные", format!("{} голов {}", herd.count, herd.kind))
            .section(
                "ТЕКУЩИЕ КОРМА (введены пользователем)",
                Self::inventory_list(feeds),
            )
            .numbered(
                "Дай АНАЛИЗ в формате (КРАТКО, по пунктам)",
                vec![
                    "ОЦЕНКА БАЛАНСА: достаточно ли белка, энергии, витаминов? (2-3 пункта)",
                    "ЭКОНОМИЯ: как снизить затраты без потери качества? (2-3 конкретных совета с ценами в ₸)",
                    "ПРЕДУПРЕЖДЕНИЯ: что не так или чего не хватает? (1-2 критичных момента)",
                    "РЕКОМЕНДАЦИИ: что добавить или изменить? (2-3 практичных совета)",
                ],
            )
            .text("Каждый пункт - ОДНО короткое предложение с цифрами.")
            .build()
    }

    /// Critique of a field's fertilizer plan, as a JSON object or labeled text.
    pub fn fertilizer_analysis(
        field: &FieldProfile,
        fertilizers: &[InventoryLine],
        format: ResponseFormat,
    ) -> String {
        let area = format_quantity(field.area);
        let builder = PromptBuilder::new()
            .role(
                AGRONOMIST,
                "ПРОАНАЛИЗИРУЙ план внесения удобрений и дай ПРАКТИЧНЫЕ советы.",
            )
            .context_item("Поле", &field.name)
            .context_item("Культура", &field.crop_type)
            .context_item("Площадь", format!("{} га", area))
            .section(
                "ТЕКУЩИЕ УДОБРЕНИЯ (введены пользователем)",
                Self::inventory_list(fertilizers),
            )
            .rules(vec![
                format!(
                    "Учитывай площадь поля ({} га) при оценке количества удобрений.",
                    area
                ),
                format!(
                    "Норма внесения должна быть в кг/га, а общее количество = норма × {} га",
                    area
                ),
            ]);

        match format {
            ResponseFormat::Json => builder
                .text(format!("{}:", JSON_ONLY))
                .code("json", FERTILIZER_SCHEMA)
                .text("Каждый пункт - ОДНО короткое предложение с цифрами и ценами в ₸.")
                .build(),
            ResponseFormat::Text => builder
                .numbered(
                    "Дай АНАЛИЗ в формате (КРАТКО, по пунктам)",
                    vec![
                        "ЭФФЕКТИВНОСТЬ: правильно ли подобраны удобрения, достаточно ли их? (2-3 пункта)",
                        "ЭКОНОМИЯ: как снизить затраты? (2-3 совета с ценами в ₸/га)",
                        "ПРЕДУПРЕЖДЕНИЯ: есть ли риск передозировки или чего не хватает? (1-2 пункта)",
                        "РЕКОМЕНДАЦИИ: что добавить или изменить, сколько внести кг/га? (2-3 совета)",
                    ],
                )
                .text("Каждый пункт - ОДНО короткое предложение с цифрами и ценами в ₸.")
                .build(),
        }
    }

    /// System prompt for the chat assistant, with the user's farm as context.
    pub fn chat_system(fields: &[FieldProfile], herds: &[HerdProfile]) -> String {
        let field_lines: Vec<String> = fields
            .iter()
            .map(|f| format!("{}: {}, {} га", f.name, f.crop_type, format_quantity(f.area)))
            .collect();
        let herd_lines: Vec<String> = herds
            .iter()
            .map(|h| format!("{}: {} голов", h.kind, h.count))
            .collect();

        PromptBuilder::new()
            .text(
                "Вы - опытный агроном-консультант AgriAI, который помогает фермерам через \
                 наводящие вопросы и индивидуальный подход.",
            )
            .bullets(
                "Контекст пользователя",
                vec![
                    format!("Количество полей: {}", fields.len()),
                    format!("Количество групп скота: {}", herds.len()),
                ],
            )
            .section("Данные о полях", bullet_lines_or_none(&field_lines))
            .section("Данные о скоте", bullet_lines_or_none(&herd_lines))
            .text(SOCRATIC_METHOD)
            .build()
    }

    /// One line per record: `"{name}: {quantity} {unit}"`, plus price and date when known.
    pub(crate) fn inventory_list(items: &[InventoryLine]) -> String {
        items
            .iter()
            .map(|item| {
                let mut line = format!("{}: {} {}", item.name, item.quantity, item.unit);
                if let Some(price) = item.price_per_unit.as_deref().filter(|p| !p.is_empty()) {
                    line.push_str(&format!(" по {}₸/{}", price, item.unit));
                }
                if let Some(raw) = item.application_date.as_deref().filter(|d| !d.is_empty()) {
                    let date = parse_date(raw)
                        .map(|d| d.format("%d.%m.%Y").to_string())
                        .unwrap_or_else(|| raw.to_string());
                    line.push_str(&format!(", внесение: {}", date));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn bullet_lines_or_none(lines: &[String]) -> String {
    if lines.is_empty() {
        return "Нет данных".to_string();
    }
    lines
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldProfile {
        FieldProfile {
            name: "Северное".into(),
            crop_type: "Пшеница".into(),
            area: 12.5,
            latitude: 51.17,
            longitude: 71.45,
        }
    }

    fn herd() -> HerdProfile {
        HerdProfile {
            kind: "Коровы".into(),
            count: 10,
        }
    }

    fn line(name: &str, price: Option<&str>, date: Option<&str>) -> InventoryLine {
        InventoryLine {
            name: name.into(),
            quantity: "100".into(),
            unit: "кг".into(),
            price_per_unit: price.map(String::from),
            application_date: date.map(String::from),
        }
    }

    #[test]
    fn test_field_analysis_worked_example() {
        let prompt = AdvisorPrompts::field_analysis(&field());
        assert!(prompt.contains("Поле: Северное"));
        assert!(prompt.contains("Площадь: 12.5 га"));
        assert!(prompt.contains("Координаты: 51.17, 71.45 (Казахстан)"));
        assert!(prompt.contains("(всего 100,000₸)"));
    }

    #[test]
    fn test_feeding_plan_revisions() {
        let json = AdvisorPrompts::feeding_plan(&herd(), ResponseFormat::Json);
        assert!(json.contains("Животные: 10 голов Коровы"));
        assert!(json.contains("\"perAnimalKg\""));
        assert!(json.contains("perAnimalKg * 10"));

        let text = AdvisorPrompts::feeding_plan(&herd(), ResponseFormat::Text);
        assert!(text.contains("\"Ингредиент: NN%\""));
        assert!(!text.contains("perAnimalKg"));
    }

    #[test]
    fn test_category_prompt() {
        let prompt = AdvisorPrompts::category(&field(), RecommendationCategory::Pesticides);
        assert!(prompt.contains("\"Пестициды и защита\""));
        assert!(prompt.contains("Культура: Пшеница"));
        assert!(prompt.contains("4-5 конкретных пунктов"));
    }

    #[test]
    fn test_inventory_list_formats() {
        let list = AdvisorPrompts::inventory_list(&[
            line("Сено", None, None),
            line("Ячмень", Some("95"), None),
            line("Аммофос", Some("240"), Some("2025-04-03")),
        ]);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines[0], "Сено: 100 кг");
        assert_eq!(lines[1], "Ячмень: 100 кг по 95₸/кг");
        assert_eq!(lines[2], "Аммофос: 100 кг по 240₸/кг, внесение: 03.04.2025");
    }

    #[test]
    fn test_fertilizer_area_rule() {
        let prompt = AdvisorPrompts::fertilizer_analysis(
            &field(),
            &[line("Селитра", None, None)],
            ResponseFormat::Json,
        );
        assert!(prompt.contains("общее количество = норма × 12.5 га"));
        assert!(prompt.contains("\"effectiveness\""));

        let text = AdvisorPrompts::fertilizer_analysis(
            &field(),
            &[line("Селитра", None, None)],
            ResponseFormat::Text,
        );
        assert!(text.contains("ЭФФЕКТИВНОСТЬ"));
        assert!(!text.contains("\"effectiveness\""));
    }

    #[test]
    fn test_chat_system_context() {
        let prompt = AdvisorPrompts::chat_system(&[field()], &[herd()]);
        assert!(prompt.contains("- Количество полей: 1"));
        assert!(prompt.contains("- Северное: Пшеница, 12.5 га"));
        assert!(prompt.contains("- Коровы: 10 голов"));
        assert!(prompt.contains("СОКРАТИЧЕСКИЙ МЕТОД"));

        let empty = AdvisorPrompts::chat_system(&[], &[]);
        assert!(empty.contains("Данные о полях:\nНет данных"));
        assert!(empty.contains("Данные о скоте:\nНет данных"));
    }
}
