use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctrls_client::{ApiClient, ClientError, PublicFormPage, SubmissionsQuery};
use ctrls_core::{
    ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_AUTH_FILE, FormSession, PageState, PatientField,
    SubmitBlocked, TemplateError, timeout_from_env_value,
};
use ctrls_forms::{
    FieldDescriptor, FormTemplate, format_datetime_for_display, format_for_display, render_schema,
    to_display_color,
};
use ctrls_types::PublicId;

#[derive(Parser)]
#[command(name = "ctrls")]
#[command(about = "Clinic public forms client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a brand color to the theme representation
    Theme {
        /// Hex color, `#RRGGBB` or `RRGGBB`
        hex: String,
    },
    /// Show a public form and its fields
    Show {
        public_id: String,
        /// Print the normalised field schema as JSON
        #[arg(long)]
        schema: bool,
    },
    /// Fill in and submit a public form
    Fill {
        public_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        cpf: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: String,
        /// M or F
        #[arg(long, default_value = "M")]
        sexo: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Answer to a form field, as `field-id=value` (repeatable)
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
        /// JSON object of `field-id: value` answers
        #[arg(long)]
        answers_file: Option<PathBuf>,
    },
    /// Log in as clinic staff
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        clinic_id: String,
    },
    /// Forget the stored staff credentials
    Logout,
    /// List the clinic's submissions
    Submissions {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = ctrls_core::DEFAULT_PAGE_SIZE)]
        size: u32,
        #[arg(long, default_value = ctrls_core::DEFAULT_SUBMISSIONS_SORT)]
        sort: String,
    },
}

/// Entry point for the `ctrls` client.
///
/// # Environment Variables
/// - `CTRLS_API_URL`: backend base URL (default: "http://localhost:8080")
/// - `CTRLS_TIMEOUT_SECS`: request timeout in seconds (default: 30)
/// - `CTRLS_AUTH_FILE`: where staff credentials are kept (default: ".ctrls/auth.json")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ctrls=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Theme { hex } => {
            println!("{}", to_display_color(&hex)?);
            Ok(())
        }
        Commands::Show { public_id, schema } => {
            show(&client()?, &parse_public_id(&public_id)?, schema).await
        }
        Commands::Fill {
            public_id,
            name,
            cpf,
            birth_date,
            sexo,
            email,
            phone,
            answers,
            answers_file,
        } => {
            let mut all_answers = match answers_file {
                Some(path) => read_answers_file(&path)?,
                None => BTreeMap::new(),
            };
            all_answers.extend(answers);

            let patient = [
                (PatientField::Name, Some(name)),
                (PatientField::Cpf, Some(cpf)),
                (PatientField::BirthDate, Some(birth_date)),
                (PatientField::Sexo, Some(sexo)),
                (PatientField::Email, email),
                (PatientField::Phone, phone),
            ];
            fill(&client()?, &parse_public_id(&public_id)?, patient, all_answers).await
        }
        Commands::Login {
            email,
            password,
            clinic_id,
        } => {
            let state = client()?.login(&email, &password, &clinic_id).await?;
            println!("Logged in to clinic {}", state.clinic_id);
            Ok(())
        }
        Commands::Logout => {
            client()?.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Submissions { page, size, sort } => {
            list_submissions(&client()?, &SubmissionsQuery { page, size, sort }).await
        }
    }
}

fn client() -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(config_from_env()?)?)
}

fn config_from_env() -> anyhow::Result<ClientConfig> {
    let api_url =
        std::env::var("CTRLS_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
    let timeout = timeout_from_env_value(std::env::var("CTRLS_TIMEOUT_SECS").ok())?;
    let auth_file = std::env::var("CTRLS_AUTH_FILE").unwrap_or_else(|_| DEFAULT_AUTH_FILE.into());
    Ok(ClientConfig::new(api_url, timeout, PathBuf::from(auth_file))?)
}

fn parse_public_id(raw: &str) -> anyhow::Result<PublicId> {
    PublicId::parse(raw).with_context(|| format!("invalid form identifier {raw:?}"))
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected field-id=value, got {raw:?}")),
    }
}

fn read_answers_file(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&contents)
        .with_context(|| format!("{} must hold a JSON object", path.display()))?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

fn print_template(template: &FormTemplate) {
    let clinic = &template.clinic_branding;
    println!("{}", clinic.name);
    if let Some(address) = &clinic.address {
        println!("{address}");
    }
    if let Some(doctor) = &template.doctor_branding {
        println!("{}", doctor.name);
        if let Some(bio) = &doctor.bio {
            println!("{bio}");
        }
    }
    println!();
    println!("{}", template.title);
    if let Some(description) = &template.description {
        println!("{description}");
    }
}

fn print_fields(fields: &[FieldDescriptor]) {
    for field in fields {
        let marker = if field.required { " *" } else { "" };
        println!("- [{}] {}{} ({})", field.id, field.label, marker, field.field_type);
        if !field.options.is_empty() {
            println!("    options: {}", field.options.join(" | "));
        }
    }
}

async fn load_page(api: &ApiClient, public_id: &PublicId) -> anyhow::Result<PublicFormPage> {
    let page = PublicFormPage::new(api.clone());
    page.load(public_id).await?;
    match page.state().await {
        PageState::Ready(_) => Ok(page),
        PageState::NotFound => bail!(TemplateError::NotFound.user_message()),
        PageState::Unavailable { reason, .. } => {
            let text = TemplateError::Unavailable(reason.clone()).user_message();
            bail!("{text} ({reason})")
        }
        PageState::Loading | PageState::Submitted { .. } => {
            bail!("form page did not settle")
        }
    }
}

async fn show(api: &ApiClient, public_id: &PublicId, schema: bool) -> anyhow::Result<()> {
    let page = load_page(api, public_id).await?;
    let PageState::Ready(form) = page.state().await else {
        bail!("form page did not settle");
    };

    print_template(&form.template);
    let css = page.theme().await.to_css();
    if !css.is_empty() {
        println!();
        print!("{css}");
    }
    println!();
    if schema {
        println!("{}", render_schema(form.session.fields())?);
    } else {
        print_fields(form.session.fields());
    }
    Ok(())
}

async fn fill(
    api: &ApiClient,
    public_id: &PublicId,
    patient: [(PatientField, Option<String>); 6],
    answers: BTreeMap<String, String>,
) -> anyhow::Result<()> {
    let page = load_page(api, public_id).await?;

    let (summary, unanswered) = page
        .edit(|session: &mut FormSession| -> anyhow::Result<(String, Vec<String>)> {
            for (field, value) in patient {
                if let Some(value) = value {
                    session.update_patient_field(field, value)?;
                }
            }
            for (id, value) in answers {
                if !session.fields().iter().any(|f| f.id == id) {
                    tracing::warn!(field_id = %id, "answer for a field not in this form");
                }
                session.update_answer(id, value);
            }

            let info = session.patient();
            let summary = format!(
                "{} (CPF {}, nascimento {})",
                info.name,
                info.cpf,
                format_for_display(&info.birth_date)
            );
            let unanswered = session
                .unanswered_required_fields()
                .into_iter()
                .map(|f| format!("{} ({})", f.label, f.id))
                .collect();
            Ok((summary, unanswered))
        })
        .await??;
    if !unanswered.is_empty() {
        bail!("Campos obrigatórios sem resposta: {}", unanswered.join(", "));
    }

    println!("Enviando formulário para {summary}");
    match page.submit().await {
        Ok(receipt) => {
            println!("Formulário enviado com sucesso!");
            if let Some(id) = receipt.submission_id {
                println!("Protocolo: {id}");
            }
            if let Some(status) = receipt.status {
                println!("Situação: {status}");
            }
            Ok(())
        }
        Err(ClientError::Submission(err)) => bail!("{}", err.user_message()),
        Err(ClientError::Blocked(SubmitBlocked::Invalid(failure))) => bail!(
            "{} ({})",
            failure.user_message(),
            failure.missing_keys().join(", ")
        ),
        Err(other) => Err(other.into()),
    }
}

async fn list_submissions(api: &ApiClient, query: &SubmissionsQuery) -> anyhow::Result<()> {
    let page = match api.list_submissions(query).await {
        Ok(page) => page,
        Err(ClientError::NotAuthenticated) => bail!("Not logged in. Run `ctrls login` first."),
        Err(ClientError::Unauthorized) => bail!("Session expired. Run `ctrls login` again."),
        Err(e) => return Err(e.into()),
    };

    if page.content.is_empty() {
        println!("No submissions found.");
        return Ok(());
    }
    for s in &page.content {
        println!(
            "{}  {}  {}  {}  {}",
            format_datetime_for_display(&s.created_at),
            s.status,
            s.form_title,
            s.patient_name,
            s.id
        );
    }
    println!(
        "page {} of {} ({} total)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    Ok(())
}
