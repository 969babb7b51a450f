//! Prompt templates and fixed reply texts.
//!
//! All user-facing text lives here as data so it can be overridden from the
//! `[prompts]` and `[fallback]` config sections without touching service
//! logic. Templates use Handlebars syntax with named placeholders; the JSON
//! skeletons inside them use single braces and pass through untouched.

use crate::error::{ConfigError, ServiceError, ServiceResult};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SYMPTOMS_TEMPLATE: &str = "symptoms";
const IMAGE_TEMPLATE: &str = "image";
const ADVICE_TEMPLATE: &str = "advice";

const DEFAULT_EXPERT_PREAMBLE: &str = "\
أنت خبير زراعي متخصص في تشخيص أمراض النباتات. مهمتك:
1. تحليل أعراض النباتات بدقة
2. تحديد نوع المرض أو المشكلة
3. تقديم توصيات علاجية عملية
4. إعطاء نصائح وقائية

استجب باللغة العربية وكن دقيقاً ومفيداً للمزارعين.";

const DEFAULT_VISION_PREAMBLE: &str = "\
تحليل صورة نبات لـ:
1. تحديد نوع النبات
2. تشخيص أي أمراض أو مشاكل مرئية
3. تقييم شدة المشكلة
4. تقديم توصيات فورية

استجب باللغة العربية مع تفاصيل دقيقة.";

const DEFAULT_SYMPTOMS: &str = r#"{{preamble}}

معلومات النبات:
- النوع: {{plant_type}}
- الأعراض: {{symptoms}}
- الموقع: {{location}}
- الموسم: {{season}}

قم بتحليل هذه الأعراض وقدم:
1. التشخيص المحتمل
2. مستوى الثقة (0-100%)
3. الأسباب المحتملة
4. خطة العلاج
5. إجراءات الوقاية
6. متى يجب استشارة خبير

استجب بتنسيق JSON:
{
    "diagnosis": "التشخيص",
    "confidence": 85,
    "causes": ["السبب 1", "السبب 2"],
    "treatment_plan": "خطة العلاج",
    "prevention": "إجراءات الوقاية",
    "expert_consultation": "متى تستشير خبير",
    "severity": "high/medium/low",
    "immediate_actions": ["إجراء فوري 1", "إجراء فوري 2"]
}"#;

const DEFAULT_IMAGE: &str = r#"{{preamble}}

{{#if plant_type}}نوع النبات المتوقع: {{plant_type}}{{else}}حدد نوع النبات{{/if}}

قم بتحليل هذه الصورة بدقة وقدم:
1. نوع النبات (إذا لم يتم تحديده)
2. حالة النبات الصحية
3. أي أمراض أو مشاكل مرئية
4. شدة المشكلة
5. توصيات فورية
6. خطة علاج مفصلة

استجب بتنسيق JSON:
{
    "plant_type": "نوع النبات",
    "health_status": "excellent/good/fair/poor",
    "diseases": ["المرض 1", "المرض 2"],
    "severity": "high/medium/low",
    "confidence": 90,
    "immediate_recommendations": ["توصية 1", "توصية 2"],
    "treatment_plan": "خطة العلاج",
    "prevention_tips": "نصائح الوقاية",
    "visual_analysis": "تحليل بصري مفصل"
}"#;

const DEFAULT_ADVICE: &str = r#"{{preamble}}

السؤال: {{question}}
{{#if context}}السياق: {{context}}{{/if}}

قدم إجابة شاملة ومفيدة باللغة العربية."#;

/// Prompt templates sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptCatalog {
    /// Agricultural-expert instructions, used by symptom analysis and advice
    pub expert_preamble: String,

    /// Instructions prepended to image analysis
    pub vision_preamble: String,

    /// Placeholders: preamble, plant_type, symptoms, location, season
    pub symptoms: String,

    /// Placeholders: preamble, plant_type (optional)
    pub image: String,

    /// Placeholders: preamble, question, context (optional)
    pub advice: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            expert_preamble: DEFAULT_EXPERT_PREAMBLE.to_string(),
            vision_preamble: DEFAULT_VISION_PREAMBLE.to_string(),
            symptoms: DEFAULT_SYMPTOMS.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            advice: DEFAULT_ADVICE.to_string(),
        }
    }
}

/// Fixed texts placed into fallback and error records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackText {
    /// Stand-in for a missing location, season or plant type
    pub unspecified: String,

    pub symptoms_diagnosis: String,
    pub symptoms_cause: String,
    pub keep_monitoring: String,
    pub consult_if_persists: String,
    pub monitor_plant: String,
    pub diagnosis_unavailable: String,

    pub image_status_pending: String,
    pub image_disease_pending: String,
    pub visual_analysis: String,
    pub image_status_unavailable: String,

    /// Answer returned when the advice call fails
    pub advice_apology: String,
}

impl Default for FallbackText {
    fn default() -> Self {
        Self {
            unspecified: "غير محدد".to_string(),
            symptoms_diagnosis: "تحليل الأعراض".to_string(),
            symptoms_cause: "تحليل الأعراض جارٍ".to_string(),
            keep_monitoring: "استمر في المراقبة".to_string(),
            consult_if_persists: "إذا استمرت الأعراض".to_string(),
            monitor_plant: "مراقبة النبات".to_string(),
            diagnosis_unavailable: "تحليل غير متاح".to_string(),
            image_status_pending: "تحليل جارٍ".to_string(),
            image_disease_pending: "تحليل الصورة جارٍ".to_string(),
            visual_analysis: "تحليل بصري".to_string(),
            image_status_unavailable: "تحليل غير متاح".to_string(),
            advice_apology: "عذراً، لا يمكن تقديم النصيحة حالياً".to_string(),
        }
    }
}

/// Compiled prompt templates.
pub struct Prompts {
    registry: Handlebars<'static>,
    expert_preamble: String,
    vision_preamble: String,
    unspecified: String,
}

impl Prompts {
    /// Compile the catalog. Fails if any template does not parse.
    pub fn new(catalog: &PromptCatalog, text: &FallbackText) -> Result<Self, ConfigError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_escape_fn(handlebars::no_escape);

        for (name, source) in [
            (SYMPTOMS_TEMPLATE, &catalog.symptoms),
            (IMAGE_TEMPLATE, &catalog.image),
            (ADVICE_TEMPLATE, &catalog.advice),
        ] {
            registry
                .register_template_string(name, source)
                .map_err(|e| ConfigError::Template {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self {
            registry,
            expert_preamble: catalog.expert_preamble.trim().to_string(),
            vision_preamble: catalog.vision_preamble.trim().to_string(),
            unspecified: text.unspecified.clone(),
        })
    }

    /// Prompt for text-only symptom analysis.
    ///
    /// Symptoms are joined with `", "`. An empty location or season renders
    /// as the "unspecified" text.
    pub fn symptoms(
        &self,
        plant_type: &str,
        symptoms: &[String],
        location: Option<&str>,
        season: Option<&str>,
    ) -> ServiceResult<String> {
        let data = json!({
            "preamble": self.expert_preamble,
            "plant_type": plant_type,
            "symptoms": symptoms.join(", "),
            "location": self.or_unspecified(location),
            "season": self.or_unspecified(season),
        });
        self.render(SYMPTOMS_TEMPLATE, &data)
    }

    /// Prompt for image analysis. Without a plant type the model is asked
    /// to identify it.
    pub fn image(&self, plant_type: Option<&str>) -> ServiceResult<String> {
        let data = json!({
            "preamble": self.vision_preamble,
            "plant_type": non_empty(plant_type),
        });
        self.render(IMAGE_TEMPLATE, &data)
    }

    /// Prompt for free-form advice.
    pub fn advice(&self, question: &str, context: Option<&str>) -> ServiceResult<String> {
        let data = json!({
            "preamble": self.expert_preamble,
            "question": question,
            "context": non_empty(context),
        });
        self.render(ADVICE_TEMPLATE, &data)
    }

    fn or_unspecified<'a>(&'a self, value: Option<&'a str>) -> &'a str {
        non_empty(value).unwrap_or(self.unspecified.as_str())
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> ServiceResult<String> {
        self.registry
            .render(name, data)
            .map_err(|e| ServiceError::Prompt {
                template: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Treat `Some("")` the same as `None`.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
