use anyhow::Context as _;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::GenerationError;
use crate::form::FormData;

use super::generator::{DocumentGenerator, GenerationFuture};
use super::types::{NarrativeItem, NarrativeType, ResponseLetter};

const LETTER_TEMPLATE: &str = "letter";

const JUSTICE_INVOLVEMENT: &str = "\
{% if offenses %}I want to be upfront about my past. \
{% for o in offenses %}I was convicted of {{ o.type }}: {{ o.description }}.{% if not loop.last %} {% endif %}{% endfor %}\
{% else %}I want to be upfront about my involvement with the justice system.{% endif %}\
{% if release %} I was released in {{ release }}.{% endif %}\
{% if ownership %} {{ ownership }}{% endif %}";

const PERSONAL_GROWTH: &str = "\
Since that time I have worked deliberately on becoming a different person.\
{% if programs %} I completed {{ programs | join(sep=\", \") }}.{% endif %}\
{% if lessons_learned %} {{ lessons_learned }}{% endif %}\
{% if impact %} I understand the impact my actions had: {{ impact }}{% endif %}";

const SKILLS_AND_EXPERIENCE: &str = "\
{% if skills %}I bring practical skills in {{ skills | join(sep=\", \") }}.{% else %}I bring a strong work ethic and a willingness to learn.{% endif %}\
{% if qualifications %} {{ qualifications }}{% endif %}";

const JOB_READINESS: &str = "\
I am ready to contribute{% if job_title %} as a {{ job_title }}{% endif %}\
{% if employer_name %} at {{ employer_name }}{% endif %}.\
{% if clarifying_relevance %} {{ clarifying_relevance }}{% endif %}\
{% if additional_context %} {{ additional_context }}{% endif %}";

const FUTURE_GOALS: &str = "\
Looking forward, I intend to keep building on the progress I have made\
{% if programs %} through {{ programs | first }}{% endif %} \
and to be a reliable, trusted member of any team I join.";

const RESPONSE_LETTER: &str = "\
Dear {% if employer_name %}{{ employer_name }} Hiring Team{% else %}Hiring Manager{% endif %},

Thank you for the opportunity to respond to the background check results before a final decision is made\
{% if job_title %} on my application for the {{ job_title }} position{% endif %}.

{% if offenses %}The report reflects {% for o in offenses %}{{ o.type }}{% if not loop.last %}, {% endif %}{% endfor %}. \
{% endif %}{% if ownership %}{{ ownership }} {% endif %}{% if lessons_learned %}{{ lessons_learned }}{% endif %}

{% if clarifying_relevance %}{{ clarifying_relevance }}

{% endif %}{% if programs or skills %}Since my release{% if release %} in {{ release }}{% endif %}, I have \
{% if programs %}completed {{ programs | join(sep=\", \") }}{% endif %}\
{% if programs and skills %} and {% endif %}\
{% if skills %}developed skills in {{ skills | join(sep=\", \") }}{% endif %}.

{% endif %}{% if qualifications %}{{ qualifications }}

{% endif %}I respectfully ask that you consider this information in an individualized assessment.

Sincerely,";

#[derive(Serialize)]
struct OffenseView<'a> {
    #[serde(rename = "type")]
    offense_type: &'a str,
    description: &'a str,
    programs: &'a [String],
}

/// Builds the template context shared by document and prompt templates.
/// Optional toggled sections render as empty strings when switched off.
pub(super) fn form_context(form: &FormData) -> Context {
    let mut ctx = Context::new();
    let offenses: Vec<OffenseView<'_>> = form
        .offenses
        .iter()
        .map(|o| OffenseView {
            offense_type: o.offense_type.trim(),
            description: o.description.trim(),
            programs: &o.programs,
        })
        .collect();
    let release = format!("{} {}", form.release_month.trim(), form.release_year.trim());

    ctx.insert("offenses", &offenses);
    ctx.insert("release", release.trim());
    ctx.insert("programs", &form.programs);
    ctx.insert("skills", &form.skills);
    ctx.insert("additional_context", form.additional_context.trim());
    ctx.insert("job_title", form.job_title.trim());
    ctx.insert("employer_name", form.employer_name.trim());
    ctx.insert("ownership", form.ownership.trim());
    ctx.insert("impact", form.impact.trim());
    ctx.insert("lessons_learned", form.lessons_learned.trim());
    ctx.insert(
        "clarifying_relevance",
        form.effective_clarifying_relevance().unwrap_or_default(),
    );
    ctx.insert("qualifications", form.qualifications.trim());
    ctx.insert("resume_text", form.effective_resume_text().unwrap_or_default());
    ctx.insert(
        "job_posting_text",
        form.effective_job_posting_text().unwrap_or_default(),
    );
    ctx
}

/// Deterministic documents rendered straight from the form fields.
pub struct TemplateGenerator {
    tera: Tera,
}

impl TemplateGenerator {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for (kind, body) in [
            (NarrativeType::JusticeInvolvement, JUSTICE_INVOLVEMENT),
            (NarrativeType::PersonalGrowth, PERSONAL_GROWTH),
            (NarrativeType::SkillsAndExperience, SKILLS_AND_EXPERIENCE),
            (NarrativeType::JobReadiness, JOB_READINESS),
            (NarrativeType::FutureGoals, FUTURE_GOALS),
        ] {
            tera.add_raw_template(&kind.to_string(), body)
                .with_context(|| format!("register {kind} template"))?;
        }
        tera.add_raw_template(LETTER_TEMPLATE, RESPONSE_LETTER)
            .context("register response letter template")?;
        Ok(Self { tera })
    }

    fn render(&self, name: &str, form: &FormData) -> Result<String, GenerationError> {
        self.tera
            .render(name, &form_context(form))
            .map(|text| text.trim().to_string())
            .map_err(|e| GenerationError::Template(format!("{name}: {e}")))
    }
}

impl DocumentGenerator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    fn generate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        form: &'a FormData,
    ) -> GenerationFuture<'a, NarrativeItem> {
        Box::pin(async move {
            let content = self.render(&narrative_type.to_string(), form)?;
            Ok(NarrativeItem::new(narrative_type, content))
        })
    }

    fn generate_letter<'a>(&'a self, form: &'a FormData) -> GenerationFuture<'a, ResponseLetter> {
        Box::pin(async move {
            let content = self.render(LETTER_TEMPLATE, form)?;
            Ok(ResponseLetter::new(content))
        })
    }
}
