//! Document renderer: drives the layout engine through the fixed stage
//! sequence of one document.

use crate::assets::ImageAsset;
use crate::blueprint::{self, is_admin_key, is_file_field};
use crate::canvas::{Canvas, TextStyle};
use crate::config::RenderConfig;
use crate::error::Error;
use crate::format::{self, humanize_label, is_privacy_field};
use crate::layout::{LayoutEngine, LayoutOutput};
use crate::model::{Blueprint, FieldSpec, FieldType, SectionSpec, SubmissionRecord, Value};

pub const IMPORTANT_NOTICE: &[&str] = &[
    "Filled by the \"Insured\" named on the policy schedule.",
    "Use CAPITAL LETTERS; must be signed by the Insured; all * items required.",
    "Issue of this form does not imply admission of liability.",
];

pub const CLAIMS_PROCEDURE: &[&str] = &[
    "Notify NEM Insurance immediately.",
    "Additional documents/clarifications may be requested depending on claim requirements.",
    "For claim status enquiries call 01 448 9570.",
    "NEM Insurance Plc. is regulated by NAICOM.",
    "NEM Insurance Plc. reserves the right to refute any fraudulent claims.",
];

pub const DATA_PRIVACY: &[&str] = &[
    "Personal data is used solely for the business contract and to send product/service updates.",
    "Data is handled per Nigeria Data Protection Regulation 2019 with appropriate security.",
    "Data isn't shared/sold to third parties without consent unless required by law/regulator.",
];

pub const DECLARATION: &[&str] = &[
    "Information provided is true; false/fraudulent statements can cancel policy/forfeit claim.",
    "Insured agrees to provide additional information if required.",
    "Insured agrees to submit all requested documents; delays due to non-fulfillment are not NEM's responsibility.",
];

const SIGNER_KEYS: &[&str] = &[
    "signature",
    "policyholderSignature",
    "insuredSignature",
    "directorSignature",
    "signatoryName",
    "nameOfInsured",
    "fullName",
    "companyName",
    "name",
];

const DATE_KEYS: &[&str] = &[
    "signatureDate",
    "declarationDate",
    "submittedAt",
    "createdAt",
    "timestamp",
    "updatedAt",
];

const POLICY_KEYS: &[&str] = &["policyNumber", "periodOfCoverFrom", "periodOfCoverTo"];

const BLOCK_TEXT: TextStyle = TextStyle::regular(9.0);

/// Render stages, in the only order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Header,
    TitleNotice,
    Sections,
    Attachments,
    Privacy,
    Declaration,
    FormNote,
    Procedure,
    Finalize,
}

/// Whether a conditional field's trigger holds. String equality, with
/// booleans and numbers compared through their text form.
pub fn condition_met(record: &SubmissionRecord, depends_on: &str, required: &str) -> bool {
    match record.get(depends_on) {
        Some(Value::Text(s)) => s == required,
        Some(Value::Bool(b)) => required == if *b { "true" } else { "false" },
        Some(Value::Number(n)) => format::format_number(*n) == required,
        _ => false,
    }
}

fn is_hidden_section(section: &SectionSpec) -> bool {
    let title = section.title.to_lowercase();
    title.contains("system") || title.contains("file upload")
}

/// Display name of whoever signs the declaration.
pub fn resolve_signer(record: &SubmissionRecord) -> Option<String> {
    SIGNER_KEYS
        .iter()
        .find_map(|k| record.text(k))
        .map(|s| format::sanitize(&s))
        .filter(|s| !s.is_empty())
}

/// Submission date shown beside the signature, or today.
pub fn resolve_date(record: &SubmissionRecord) -> String {
    DATE_KEYS
        .iter()
        .filter_map(|k| record.get(k))
        .find_map(format::parse_date)
        .unwrap_or_else(|| chrono::Local::now().naive_local())
        .format("%d/%m/%Y")
        .to_string()
}

/// Attachment entries for every present file-reference field.
pub fn attachment_labels(record: &SubmissionRecord) -> Vec<String> {
    let mut labels = Vec::new();
    for (key, value) in record.iter() {
        if value.is_blank() || is_admin_key(key) {
            continue;
        }
        if !is_file_field(key, Some(value)) {
            continue;
        }
        let label = humanize_label(key.strip_suffix("Url").unwrap_or(key));
        match value {
            Value::Array(items) => {
                let present = items.iter().filter(|v| !v.is_blank()).count();
                labels.extend((1..=present).map(|i| format!("{label} {i}")));
            }
            _ => labels.push(label),
        }
    }
    labels
}

/// Filename for the rendered document: display name and form type joined by
/// a hyphen, whitespace runs replaced by hyphens.
pub fn document_filename(record: &SubmissionRecord, form_type: &str) -> String {
    let name = record
        .text("companyName")
        .or_else(|| record.text("nameOfInsured"))
        .or_else(|| record.text("insuredName"))
        .or_else(|| record.text("fullName"))
        .or_else(|| match (record.text("firstName"), record.text("lastName")) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        })
        .or_else(|| record.text("firstName"))
        .or_else(|| record.text("name"))
        .unwrap_or_else(|| "submission".to_string());
    let hyphenate = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}-{}.pdf", hyphenate(&name), hyphenate(form_type))
}

pub struct DocumentRenderer<'a, C: Canvas> {
    record: &'a SubmissionRecord,
    blueprint: Blueprint,
    config: &'a RenderConfig,
    logo: Option<ImageAsset>,
    engine: LayoutEngine<C>,
    stage: Stage,
}

impl<'a, C: Canvas> DocumentRenderer<'a, C> {
    pub fn new(
        record: &'a SubmissionRecord,
        blueprint: Blueprint,
        config: &'a RenderConfig,
        logo: Option<ImageAsset>,
        canvas: C,
    ) -> Self {
        let engine = LayoutEngine::new(canvas, config.page, config.letterhead.company.clone());
        Self {
            record,
            blueprint,
            config,
            logo,
            engine,
            stage: Stage::Header,
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(stage >= self.stage);
        log::debug!(
            "Stage {:?} -> {:?} (page {}, y={:.1})",
            self.stage,
            stage,
            self.engine.cursor().page_number(),
            self.engine.cursor().y()
        );
        self.stage = stage;
    }

    /// Run every stage and serialize. Consumes the renderer, so finalization
    /// happens exactly once.
    pub fn run(mut self) -> Result<LayoutOutput, Error> {
        self.enter(Stage::Header);
        self.engine.place_letterhead(self.logo.as_ref(), &self.config.letterhead);

        self.enter(Stage::TitleNotice);
        self.title_and_notice();

        self.enter(Stage::Sections);
        let sections = std::mem::take(&mut self.blueprint.sections);
        for section in sections.iter().filter(|s| !is_hidden_section(s)) {
            self.section(section);
        }

        self.enter(Stage::Attachments);
        let attachments = attachment_labels(self.record);
        if !attachments.is_empty() {
            self.engine.place_section_header("Attachments");
            self.engine.place_bullets(&attachments, BLOCK_TEXT);
        }

        self.enter(Stage::Privacy);
        self.boilerplate("Data Privacy Statement", DATA_PRIVACY, false);

        self.enter(Stage::Declaration);
        self.declaration();

        self.enter(Stage::FormNote);
        if self.blueprint.special_handling.rent_assurance_note {
            self.rent_assurance_note();
        }

        self.enter(Stage::Procedure);
        self.boilerplate("Claims Procedure", CLAIMS_PROCEDURE, false);

        self.enter(Stage::Finalize);
        self.engine.finish()
    }

    fn title_and_notice(&mut self) {
        self.engine.place_title(&self.blueprint.title);
        if POLICY_KEYS.iter().any(|k| self.record.get(k).is_some_and(|v| !v.is_blank())) {
            let policy_number = self.record.get("policyNumber").map(|v| format::format_value(v, FieldType::Text));
            let from = self.record.get("periodOfCoverFrom").map(format::format_date);
            let to = self.record.get("periodOfCoverTo").map(format::format_date);
            let blank = || "_____________".to_string();
            let not_blank = |s: Option<String>| s.filter(|s| !s.is_empty() && s != format::NOT_AVAILABLE);
            self.engine.place_info_box(&[
                ("Policy Number:".to_string(), not_blank(policy_number).unwrap_or_else(blank)),
                (
                    "Period of Cover:".to_string(),
                    format!(
                        "{} to {}",
                        not_blank(from).unwrap_or_else(blank),
                        not_blank(to).unwrap_or_else(blank)
                    ),
                ),
            ]);
        }
        self.boilerplate("Important Notice", IMPORTANT_NOTICE, false);
    }

    fn boilerplate(&mut self, title: &str, items: &[&str], numbered: bool) {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        self.engine.place_block_heading(title);
        if numbered {
            self.engine.place_numbered(&items, BLOCK_TEXT);
        } else {
            self.engine.place_bullets(&items, BLOCK_TEXT);
        }
    }

    fn visible_fields<'s>(&self, section: &'s SectionSpec) -> Vec<&'s FieldSpec> {
        section
            .fields
            .iter()
            .filter(|f| !is_admin_key(&f.key))
            .filter(|f| !is_privacy_field(&f.key, &f.label))
            .filter(|f| match &f.conditional {
                Some(c) => condition_met(self.record, &c.depends_on, &c.required_value),
                None => true,
            })
            .collect()
    }

    fn section(&mut self, section: &SectionSpec) {
        let fields = self.visible_fields(section);
        if fields.is_empty() {
            log::debug!("Section \"{}\": nothing to show", section.title);
            return;
        }
        self.engine.place_section_header(&section.title);
        let handling = self.blueprint.special_handling;
        for field in fields {
            self.engine.place_field(field, self.record.get(&field.key), handling);
        }
    }

    fn declaration(&mut self) {
        self.boilerplate("Declaration", DECLARATION, true);
        let signer = resolve_signer(self.record).unwrap_or_default();
        let date = resolve_date(self.record);
        self.engine
            .place_signature_line("Signature of Policyholder", &signer, Some(&date));
    }

    fn rent_assurance_note(&mut self) {
        let blank = || "_____________".to_string();
        let insured = self.record.text("nameOfInsured").map(|s| format::sanitize(&s)).unwrap_or_else(blank);
        let address = self.record.text("address").map(|s| format::sanitize(&s)).unwrap_or_else(blank);
        let amount = self
            .record
            .get("amountDefaulted")
            .and_then(format::parse_amount)
            .unwrap_or(0.0);
        let note = format!(
            "I {insured} of {address} do hereby warrant the truth of the answers given above and claim \
             for loss amounting in all to {}. Dated this _____ day of _____ 20___.",
            format::format_amount(amount, Some(format::CURRENCY_SYMBOL))
        );
        self.engine.place_block_heading("Rent Assurance Claim Note");
        self.engine.place_paragraph(&note, TextStyle::regular(9.5));
        self.engine.place_signature_line("Signature of Insured", "", None);
        self.engine.place_paragraph(
            "Note: attach a copy of the rent agreement and demand note on renewal and/or quit notice.",
            TextStyle::bold(9.0),
        );
        self.engine.gap(6.0);
    }
}

/// Resolve, lay out and serialize `record` on `canvas`.
pub fn render_document<C: Canvas>(
    record: &SubmissionRecord,
    form_type: Option<&str>,
    config: &RenderConfig,
    logo: Option<ImageAsset>,
    canvas: C,
) -> Result<LayoutOutput, Error> {
    let blueprint = blueprint::resolve(record, form_type);
    log::debug!(
        "Rendering \"{}\": {} sections, {} fields",
        blueprint.title,
        blueprint.sections.len(),
        blueprint.fields().count()
    );
    DocumentRenderer::new(record, blueprint, config, logo, canvas).run()
}
