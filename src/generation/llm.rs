use anyhow::Context as _;
use std::sync::Arc;
use tera::Tera;

use crate::error::GenerationError;
use crate::form::FormData;
use crate::providers::Provider;

use super::generator::{DocumentGenerator, GenerationFuture};
use super::template::form_context;
use super::types::{NarrativeItem, NarrativeType, ResponseLetter};

const SYSTEM_PROMPT: &str = "You help people with conviction histories prepare for employment. \
Write in the first person, in plain and warm language, without legal advice. \
Never invent facts that are not in the provided details. \
Return only the document text, with no headings or commentary.";

const DETAILS_PROMPT: &str = "\
Details provided by the applicant:
{% for o in offenses %}- Offense: {{ o.type }}: {{ o.description }}{% if o.programs %} (programs: {{ o.programs | join(sep=\", \") }}){% endif %}
{% endfor %}{% if release %}- Released: {{ release }}
{% endif %}{% if programs %}- Programs completed: {{ programs | join(sep=\", \") }}
{% endif %}{% if skills %}- Skills: {{ skills | join(sep=\", \") }}
{% endif %}{% if additional_context %}- Additional context: {{ additional_context }}
{% endif %}{% if job_title %}- Position applied for: {{ job_title }}{% if employer_name %} at {{ employer_name }}{% endif %}
{% endif %}{% if ownership %}- Ownership: {{ ownership }}
{% endif %}{% if impact %}- Impact: {{ impact }}
{% endif %}{% if lessons_learned %}- Lessons learned: {{ lessons_learned }}
{% endif %}{% if clarifying_relevance %}- Relevance to the role: {{ clarifying_relevance }}
{% endif %}{% if qualifications %}- Qualifications: {{ qualifications }}
{% endif %}{% if resume_text %}- Resume:
{{ resume_text }}
{% endif %}{% if job_posting_text %}- Job posting:
{{ job_posting_text }}
{% endif %}";

const NARRATIVE_PROMPT: &str = "\
Write a short disclosure narrative (120 to 200 words) focused on: {{ focus }}.

{% include \"details\" %}";

const LETTER_PROMPT: &str = "\
Write a pre-adverse action response letter to the employer after a background check. \
Acknowledge the record, show accountability and rehabilitation, explain why the record \
does not bear on the duties of the position, and request an individualized assessment. \
Keep it under 400 words and close with \"Sincerely,\".

{% include \"details\" %}";

fn focus(narrative_type: NarrativeType) -> &'static str {
    match narrative_type {
        NarrativeType::JusticeInvolvement => {
            "an honest, brief account of the justice involvement and taking responsibility"
        }
        NarrativeType::PersonalGrowth => {
            "personal growth and transformation since the offense, including programs completed"
        }
        NarrativeType::SkillsAndExperience => {
            "skills, training and work experience relevant to employment"
        }
        NarrativeType::JobReadiness => "readiness for the position and reliability as an employee",
        NarrativeType::FutureGoals => "goals for the future and commitment to continued growth",
    }
}

pub struct LlmGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    prompts: Tera,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: &str, temperature: f64) -> anyhow::Result<Self> {
        let mut prompts = Tera::default();
        prompts.autoescape_on(vec![]);
        prompts
            .add_raw_templates(vec![
                ("details", DETAILS_PROMPT),
                ("narrative", NARRATIVE_PROMPT),
                ("letter", LETTER_PROMPT),
            ])
            .context("register generation prompts")?;
        Ok(Self {
            provider,
            model: model.to_string(),
            temperature,
            prompts,
        })
    }

    fn render_prompt(
        &self,
        name: &str,
        form: &FormData,
        narrative_type: Option<NarrativeType>,
    ) -> Result<String, GenerationError> {
        let mut ctx = form_context(form);
        if let Some(kind) = narrative_type {
            ctx.insert("focus", focus(kind));
        }
        self.prompts
            .render(name, &ctx)
            .map_err(|e| GenerationError::Template(format!("{name} prompt: {e}")))
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let text = self
            .provider
            .chat_with_system(Some(SYSTEM_PROMPT), prompt, &self.model, self.temperature)
            .await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyOutput {
                provider: self.provider.name().to_string(),
            }
            .into());
        }
        Ok(text.to_string())
    }
}

impl DocumentGenerator for LlmGenerator {
    fn name(&self) -> &str {
        "llm"
    }

    fn generate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        form: &'a FormData,
    ) -> GenerationFuture<'a, NarrativeItem> {
        Box::pin(async move {
            let prompt = self.render_prompt("narrative", form, Some(narrative_type))?;
            let content = self
                .complete(&prompt)
                .await
                .with_context(|| format!("{narrative_type} narrative"))?;
            Ok(NarrativeItem::new(narrative_type, content))
        })
    }

    fn generate_letter<'a>(&'a self, form: &'a FormData) -> GenerationFuture<'a, ResponseLetter> {
        Box::pin(async move {
            let prompt = self.render_prompt("letter", form, None)?;
            let content = self
                .complete(&prompt)
                .await
                .context("response letter")?;
            Ok(ResponseLetter::new(content))
        })
    }

    fn warmup(&self) -> GenerationFuture<'_, ()> {
        self.provider.warmup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Offense;
    use crate::providers::ProviderFuture;
    use std::sync::Mutex;

    /// Echoes prompts back and remembers what it was asked.
    #[derive(Default)]
    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn chat_with_system<'a>(
            &'a self,
            _system_prompt: Option<&'a str>,
            message: &'a str,
            _model: &'a str,
            _temperature: f64,
        ) -> ProviderFuture<'a, String> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(message.to_string());
                match &self.reply {
                    Some(reply) => Ok(reply.clone()),
                    None => anyhow::bail!("upstream unavailable"),
                }
            })
        }
    }

    fn form() -> FormData {
        FormData {
            offenses: vec![Offense {
                id: "1".into(),
                offense_type: "Burglary".into(),
                description: "2012 conviction".into(),
                programs: vec!["Thinking for a Change".into()],
            }],
            job_title: "Warehouse Associate".into(),
            resume_text: "secret resume".into(),
            ..FormData::default()
        }
    }

    #[tokio::test]
    async fn narrative_prompt_carries_focus_and_details() {
        let provider = Arc::new(RecordingProvider {
            reply: Some("Generated text".into()),
            ..RecordingProvider::default()
        });
        let generator = LlmGenerator::new(provider.clone(), "test-model", 0.4).unwrap();

        let item = generator
            .generate_narrative(NarrativeType::FutureGoals, &form())
            .await
            .unwrap();
        assert_eq!(item.content, "Generated text");
        assert_eq!(item.title, "Future Goals");

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("goals for the future"));
        assert!(prompts[0].contains("Burglary: 2012 conviction"));
        assert!(prompts[0].contains("Thinking for a Change"));
        assert!(
            !prompts[0].contains("secret resume"),
            "resume is only shared when the user opts in"
        );
    }

    #[tokio::test]
    async fn letter_prompt_names_position() {
        let provider = Arc::new(RecordingProvider {
            reply: Some("Dear team".into()),
            ..RecordingProvider::default()
        });
        let generator = LlmGenerator::new(provider.clone(), "m", 0.4).unwrap();
        generator.generate_letter(&form()).await.unwrap();
        assert!(provider.prompts.lock().unwrap()[0].contains("Warehouse Associate"));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_with_context() {
        let generator =
            LlmGenerator::new(Arc::new(RecordingProvider::default()), "m", 0.4).unwrap();
        let err = generator.generate_letter(&form()).await.unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("response letter"));
        assert!(text.contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn blank_completion_is_rejected() {
        let provider = Arc::new(RecordingProvider {
            reply: Some("   ".into()),
            ..RecordingProvider::default()
        });
        let generator = LlmGenerator::new(provider, "m", 0.4).unwrap();
        let err = generator
            .generate_narrative(NarrativeType::JobReadiness, &form())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("empty document"));
    }
}
