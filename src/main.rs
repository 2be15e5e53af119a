//! CaseDesk command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use casedesk::config::AppConfig;
use casedesk::db::{
    CaseRecord, ContactProfileRecord, CreateCaseParams, CreateContactProfileParams, Database,
    ProfileKind, UpdateCaseParams, connect_from_config,
};
use casedesk::hooks::{PostInstallOutcome, run_post_install};
use casedesk::legal::CaseOrigin;
use casedesk::legal::constants::{CaseType, EntityType, Language, PartyStatus, Sex};
use casedesk::legal::terminology::app_menu_name;
use casedesk::settings::{DEFAULT_SETTINGS_PATH, Settings};

#[derive(Parser)]
#[command(name = "casedesk", version, about = "Law-office case and matter tracker")]
struct Cli {
    /// Path to the settings file.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the database and run the post-install hook.
    Init,
    /// Case and matter records.
    #[command(subcommand)]
    Case(CaseCommand),
    /// Client and lead intake profiles.
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Administrative maintenance.
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum CaseCommand {
    /// Create a case or matter.
    Create {
        title: String,
        /// Entry point the record is filed under; sets the default tag when
        /// no explicit --tag is given.
        #[arg(long, value_enum)]
        origin: Option<CaseOrigin>,
        /// Manually chosen office file number; locked once accepted.
        #[arg(long)]
        file_number: Option<i64>,
        /// Accept a file number beyond max+1 (leaves a gap).
        #[arg(long)]
        bypass_sequence_check: bool,
        #[arg(long)]
        court_name: Option<String>,
        #[arg(long)]
        court_circle: Option<String>,
        #[arg(long)]
        filing_date: Option<NaiveDate>,
        #[arg(long)]
        first_degree_case_number: Option<String>,
        #[arg(long)]
        second_degree_case_number: Option<String>,
        #[arg(long, value_enum)]
        case_type: Option<CaseType>,
        #[arg(long, value_enum)]
        client_status: Option<PartyStatus>,
        #[arg(long, value_enum)]
        opponent_status: Option<PartyStatus>,
        #[arg(long)]
        opponent_name: Option<String>,
        #[arg(long)]
        opponent_address: Option<String>,
        #[arg(long)]
        opponent_phone: Option<String>,
        #[arg(long)]
        opponent_attorney_name: Option<String>,
        #[arg(long)]
        opponent_attorney_phone: Option<String>,
        /// May be given multiple times; explicit tags suppress the origin
        /// default.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List all cases.
    List,
    /// Show one case in full.
    Show { id: Uuid },
    /// Allocate and lock the next free office file number.
    NextNumber { id: Uuid },
    /// Set the office file number manually.
    SetNumber {
        id: Uuid,
        number: i64,
        /// Accept a file number beyond max+1 (leaves a gap).
        #[arg(long)]
        bypass_sequence_check: bool,
    },
    /// Delete a case.
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ContactCommand {
    /// Add a contact or lead profile.
    Add {
        name: String,
        #[arg(long, value_enum, default_value = "contact")]
        kind: ProfileKind,
        #[arg(long)]
        client_open_date: Option<NaiveDate>,
        #[arg(long)]
        name_en: Option<String>,
        #[arg(long)]
        nationality: Option<String>,
        #[arg(long)]
        residence_country: Option<String>,
        #[arg(long)]
        national_id: Option<String>,
        #[arg(long)]
        passport_number: Option<String>,
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long, value_enum)]
        sex: Option<Sex>,
        #[arg(long, value_enum)]
        preferred_language: Option<Language>,
        #[arg(long)]
        communication_preferences: Option<String>,
        #[arg(long)]
        representative: Option<String>,
        #[arg(long)]
        representative_title: Option<String>,
        #[arg(long, value_enum)]
        entity_type: Option<EntityType>,
        #[arg(long)]
        commercial_register_no: Option<String>,
        #[arg(long)]
        tax_registration_number: Option<String>,
        #[arg(long)]
        company_activity: Option<String>,
    },
    /// List profiles, optionally restricted to one kind.
    List {
        #[arg(long, value_enum)]
        kind: Option<ProfileKind>,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Assign sequential office file numbers to every case missing one.
    BackfillFileNumbers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;
    let config = AppConfig::resolve(&settings)?;
    let db = connect_from_config(&config.database)
        .await
        .context("failed to open database")?;

    match cli.command {
        Command::Init => run_init(&db, &config).await,
        Command::Case(cmd) => run_case(&db, cmd).await,
        Command::Contact(cmd) => run_contact(&db, cmd).await,
        Command::Admin(cmd) => run_admin(&db, cmd).await,
    }
}

async fn run_init(db: &Arc<dyn Database>, config: &AppConfig) -> anyhow::Result<()> {
    // Migrations already ran while connecting; only the hook remains.
    let outcome = run_post_install(db.as_ref()).await?;
    match outcome {
        PostInstallOutcome::DeactivatedConflictingModule => {
            println!("initialized; deactivated conflicting companion module");
        }
        PostInstallOutcome::NothingToDo => println!("initialized"),
        PostInstallOutcome::AlreadyRan => println!("already initialized"),
    }
    println!("menu: {}", app_menu_name(config.menu_language));
    Ok(())
}

async fn run_case(db: &Arc<dyn Database>, cmd: CaseCommand) -> anyhow::Result<()> {
    match cmd {
        CaseCommand::Create {
            title,
            origin,
            file_number,
            bypass_sequence_check,
            court_name,
            court_circle,
            filing_date,
            first_degree_case_number,
            second_degree_case_number,
            case_type,
            client_status,
            opponent_status,
            opponent_name,
            opponent_address,
            opponent_phone,
            opponent_attorney_name,
            opponent_attorney_phone,
            tags,
        } => {
            let params = CreateCaseParams {
                title,
                origin,
                office_file_number: file_number,
                bypass_sequence_check,
                court_name,
                court_circle,
                filing_date,
                first_degree_case_number,
                second_degree_case_number,
                case_type,
                client_status,
                opponent_status,
                opponent_name,
                opponent_address,
                opponent_phone,
                opponent_attorney_name,
                opponent_attorney_phone,
                tags,
            };
            let record = db.create_case(&params).await?;
            print_case(&record);
        }
        CaseCommand::List => {
            let cases = db.list_cases().await?;
            if cases.is_empty() {
                println!("no cases");
            }
            for case in &cases {
                println!(
                    "{}  #{}  {}",
                    case.id,
                    case.office_file_number
                        .map_or_else(|| "-".to_string(), |n| n.to_string()),
                    case.title
                );
            }
        }
        CaseCommand::Show { id } => match db.get_case(id).await? {
            Some(record) => print_case(&record),
            None => anyhow::bail!("case {id} not found"),
        },
        CaseCommand::NextNumber { id } => {
            let record = db.assign_next_file_number(id).await?;
            match record.office_file_number {
                Some(n) => println!("assigned office file number {n} to {}", record.id),
                None => anyhow::bail!("allocation returned a record without a number"),
            }
        }
        CaseCommand::SetNumber {
            id,
            number,
            bypass_sequence_check,
        } => {
            let params = UpdateCaseParams {
                office_file_number: Some(Some(number)),
                bypass_sequence_check,
                ..UpdateCaseParams::default()
            };
            match db.update_case(id, &params).await? {
                Some(record) => print_case(&record),
                None => anyhow::bail!("case {id} not found"),
            }
        }
        CaseCommand::Delete { id } => {
            if db.delete_case(id).await? {
                println!("deleted {id}");
            } else {
                anyhow::bail!("case {id} not found");
            }
        }
    }
    Ok(())
}

async fn run_contact(db: &Arc<dyn Database>, cmd: ContactCommand) -> anyhow::Result<()> {
    match cmd {
        ContactCommand::Add {
            name,
            kind,
            client_open_date,
            name_en,
            nationality,
            residence_country,
            national_id,
            passport_number,
            birth_date,
            sex,
            preferred_language,
            communication_preferences,
            representative,
            representative_title,
            entity_type,
            commercial_register_no,
            tax_registration_number,
            company_activity,
        } => {
            let params = CreateContactProfileParams {
                name,
                client_open_date,
                name_en,
                nationality,
                residence_country,
                national_id,
                passport_number,
                birth_date,
                sex,
                preferred_language,
                communication_preferences,
                representative,
                representative_title,
                entity_type,
                commercial_register_no,
                tax_registration_number,
                company_activity,
            };
            let record = db.create_contact_profile(kind, &params).await?;
            print_profile(&record);
        }
        ContactCommand::List { kind } => {
            let profiles = db.list_contact_profiles(kind).await?;
            if profiles.is_empty() {
                println!("no profiles");
            }
            for profile in &profiles {
                println!("{}  [{}]  {}", profile.id, profile.kind.as_str(), profile.name);
            }
        }
    }
    Ok(())
}

async fn run_admin(db: &Arc<dyn Database>, cmd: AdminCommand) -> anyhow::Result<()> {
    match cmd {
        AdminCommand::BackfillFileNumbers => {
            let summary = db.backfill_file_numbers().await?;
            match summary.highest_assigned {
                Some(highest) => println!(
                    "assigned {} office file number(s), highest {}",
                    summary.assigned, highest
                ),
                None => println!("all cases already numbered"),
            }
        }
    }
    Ok(())
}

fn print_case(case: &CaseRecord) {
    println!("id:                 {}", case.id);
    println!("title:              {}", case.title);
    println!(
        "office file number: {}{}",
        case.office_file_number
            .map_or_else(|| "(unassigned)".to_string(), |n| n.to_string()),
        if case.file_number_locked { " (locked)" } else { "" }
    );
    print_opt("court", case.court_name.as_deref());
    print_opt("court circle", case.court_circle.as_deref());
    if let Some(date) = case.filing_date {
        println!("filing date:        {date}");
    }
    print_opt(
        "1st degree no.",
        case.first_degree_case_number.as_deref(),
    );
    print_opt(
        "2nd degree no.",
        case.second_degree_case_number.as_deref(),
    );
    if let Some(case_type) = case.case_type {
        println!("case type:          {}", case_type.label());
    }
    if let Some(status) = case.client_status {
        println!("client status:      {}", status.label());
    }
    if let Some(status) = case.opponent_status {
        println!("opponent status:    {}", status.label());
    }
    print_opt("opponent", case.opponent_name.as_deref());
    print_opt("opponent address", case.opponent_address.as_deref());
    print_opt("opponent phone", case.opponent_phone.as_deref());
    print_opt("opp. attorney", case.opponent_attorney_name.as_deref());
    print_opt(
        "opp. attorney tel",
        case.opponent_attorney_phone.as_deref(),
    );
    if !case.tags.is_empty() {
        println!("tags:               {}", case.tags.join(", "));
    }
    println!("created:            {}", case.created_at);
}

fn print_profile(profile: &ContactProfileRecord) {
    println!("id:        {}", profile.id);
    println!("kind:      {}", profile.kind.as_str());
    println!("name:      {}", profile.name);
    print_opt("name (en)", profile.name_en.as_deref());
    if let Some(date) = profile.client_open_date {
        println!("opened:    {date}");
    }
    print_opt("nationality", profile.nationality.as_deref());
    print_opt("residence", profile.residence_country.as_deref());
    if let Some(lang) = profile.preferred_language {
        println!("language:  {}", lang.label());
    }
    if let Some(entity) = profile.entity_type {
        println!("entity:    {}", entity.label());
    }
    println!("created:   {}", profile.created_at);
}

fn print_opt(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("{label}: {value}");
    }
}
