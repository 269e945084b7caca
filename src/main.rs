use clap::{Args, Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use person_manager::auth::SessionStore;
use person_manager::backend::HttpGateway;
use person_manager::config::AppConfig;
use person_manager::error::AppError;
use person_manager::logging::init_logging;
use person_manager::models::{AuthRequest, Gender, Person, PersonDraft, RegisterRequest};
use person_manager::resource::PersonWorkflow;
use person_manager::schema::{identifier, FieldErrors};
use person_manager::storage::FileStore;
use person_manager::utils::format_display_date;

#[derive(Parser, Debug)]
#[command(name = "person-manager")]
#[command(about = "Register and manage person records")]
struct Cli {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// API base URL (overrides config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered people
    List {
        /// Filter by name, CPF, email or place of birth
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one person
    Show { id: i64 },
    /// Register a new person
    Create(PersonFields),
    /// Edit a person; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: PersonFields,
    },
    /// Remove a person
    Delete { id: i64 },
    /// Sign in and unlock the authenticated surface
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Normalize, format and check a CPF
    Cpf { value: String },
}

#[derive(Args, Debug, Default)]
struct PersonFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    cpf: Option<String>,
    /// Birth date as YYYY-MM-DD
    #[arg(long)]
    birth_date: Option<String>,
    /// Masculino, Feminino, Outro, "Prefiro não informar" or free text
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    place_of_birth: Option<String>,
    #[arg(long)]
    nationality: Option<String>,
    /// Required when signed in
    #[arg(long)]
    address: Option<String>,
}

impl PersonFields {
    fn apply(self, draft: &mut PersonDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(cpf) = self.cpf {
            draft.cpf = cpf;
        }
        if self.birth_date.is_some() {
            draft.birth_date = self.birth_date;
        }
        if self.gender.is_some() {
            draft.gender = self.gender;
        }
        if self.email.is_some() {
            draft.email = self.email;
        }
        if self.place_of_birth.is_some() {
            draft.place_of_birth = self.place_of_birth;
        }
        if self.nationality.is_some() {
            draft.nationality = self.nationality;
        }
        if self.address.is_some() {
            draft.address = self.address;
        }
    }
}

fn load_config(args: &Cli) -> Result<AppConfig, AppError> {
    let mut config = if args.config == "config.yaml" && !Path::new("config.yaml").exists() {
        AppConfig::default_config()
    } else {
        AppConfig::load_from_file(&args.config)?
    };

    if let Some(api_url) = &args.api_url {
        config.api.base_url = Some(api_url.clone());
        config.validate()?;
    }

    Ok(config)
}

fn print_person(person: &Person) {
    let id = person.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    println!("#{} {}", id, person.name);
    println!("   CPF: {}", identifier::format(&person.cpf));
    println!("   Nascimento: {}", format_display_date(&person.birth_date));
    if let Some(gender) = &person.gender {
        println!("   Sexo: {}", gender);
    }
    if let Some(email) = &person.email {
        println!("   E-mail: {}", email);
    }
    if let Some(place) = &person.place_of_birth {
        println!("   Naturalidade: {}", place);
    }
    if let Some(nationality) = &person.nationality {
        println!("   Nacionalidade: {}", nationality);
    }
    if let Some(address) = &person.address {
        println!("   Endereço: {}", address);
    }
}

fn print_people(people: &[Person]) {
    if people.is_empty() {
        println!("Nenhuma pessoa encontrada.");
        return;
    }
    for person in people {
        print_person(person);
    }
    println!("{} pessoa(s)", people.len());
}

fn present_error(error: &AppError) {
    match error {
        AppError::Validation(errors) => {
            eprintln!("Erro de validação: por favor, corrija os erros do formulário.");
            for (field, kind) in errors.iter() {
                eprintln!("  {}: {}", field, FieldErrors::message(field, kind));
            }
        }
        AppError::AuthRejected { .. } => {
            eprintln!("Erro no login: credenciais inválidas. Tente novamente.");
        }
        AppError::RequestFailed { status, body } => {
            eprintln!("Não foi possível concluir a operação (HTTP {}).", status);
            if !body.is_empty() {
                eprintln!("  {}", body);
            }
        }
        AppError::Network(e) => {
            eprintln!("Não foi possível contactar o servidor: {}", e);
        }
        other => eprintln!("{}", other),
    }
}

async fn run(args: Cli) -> Result<(), AppError> {
    let config = load_config(&args)?;

    let storage = Arc::new(FileStore::new(&config.session.dir));
    let session = Arc::new(SessionStore::open(storage));
    let gateway = Arc::new(HttpGateway::new(&config.api, session.clone())?);
    let workflow = PersonWorkflow::new(gateway.clone(), session.clone());

    match args.command {
        Command::List { search } => {
            let people = workflow.list(search.as_deref()).await?;
            print_people(&people);
        }
        Command::Show { id } => match workflow.load(id).await? {
            Some(person) => print_person(&person),
            None => println!("Pessoa {} não encontrada.", id),
        },
        Command::Create(fields) => {
            if let Some(gender) = fields.gender.as_deref() {
                if Gender::from_label(gender).is_none() {
                    println!("Aviso: sexo \"{}\" fora das opções padrão.", gender);
                }
            }
            let mut draft = PersonDraft::default();
            fields.apply(&mut draft);
            let created = workflow.create(&draft).await?;
            println!("Pessoa cadastrada com sucesso!");
            if let Some(person) = created {
                print_person(&person);
            }
        }
        Command::Update { id, fields } => {
            let Some(mut draft) = workflow.load_draft(id).await? else {
                println!("Pessoa {} não encontrada.", id);
                return Ok(());
            };
            fields.apply(&mut draft);
            workflow.update(id, &draft).await?;
            println!("Os dados de {} foram atualizados.", draft.name.trim());
        }
        Command::Delete { id } => {
            let remaining = workflow.delete(id).await?;
            println!("Pessoa removida.");
            print_people(&remaining);
        }
        Command::Login { username, password } => {
            let session = session
                .login(gateway.as_ref(), &AuthRequest { username, password })
                .await?;
            println!("Bem-vindo, {}!", session.principal.username);
        }
        Command::Register {
            username,
            password,
            role,
        } => {
            session
                .register(
                    gateway.as_ref(),
                    &RegisterRequest {
                        username,
                        password,
                        role,
                    },
                )
                .await?;
            println!("Conta criada com sucesso! Você já pode fazer login.");
        }
        Command::Logout => {
            session.logout()?;
            println!("Você foi desconectado com sucesso.");
        }
        Command::Whoami => match session.current_principal() {
            Some(principal) => println!("{} ({})", principal.username, principal.role),
            None => println!("Acesso público (sem sessão)."),
        },
        Command::Cpf { value } => {
            let digits = identifier::normalize(&value);
            println!("{}", identifier::format(&digits));
            if identifier::is_valid(&digits) {
                println!("CPF válido");
            } else {
                println!("CPF inválido");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        present_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
