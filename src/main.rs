/// Order Sender: envio de pedidos para assinatura via DocuSign
///
/// Fluxo:
/// - `connect` faz o consentimento OAuth2 e salva o token localmente
/// - `send` cria o envelope a partir do template, preenche a tabela de
///   produtos e envia para o signatário
/// - demais comandos consultam o catálogo, o token e os documentos

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde_json::json;

use docusign_order_sender::config::Settings;
use docusign_order_sender::models::{OrderSelection, ProductCatalog, Recipient};
use docusign_order_sender::services::{EnvelopeApi, TemplateFulfillment};
use docusign_order_sender::utils::{logging::*, token_preview, AppError};
use docusign_v21::{AuthManager, CallbackServer, EsignClient, TokenRecord};

/// Order Sender CLI - envia pedidos para assinatura usando templates da DocuSign
#[derive(Parser)]
#[command(name = "order-sender")]
#[command(version = "0.1.0")]
#[command(about = "Envio de pedidos para assinatura via DocuSign", long_about = None)]
struct Cli {
    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Comando a executar
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("Formato desconhecido: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Autentica via OAuth2 e salva o token
    Connect {
        /// Não abre o navegador, apenas mostra a URL de consentimento
        #[arg(long)]
        no_browser: bool,

        /// Força novo consentimento mesmo com token válido
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Mostra o token salvo e renova se estiver perto de expirar
    Status,

    /// Lista o catálogo de produtos
    Products {
        /// Produtos para calcular o total (pode repetir)
        #[arg(short = 's', long = "select")]
        select: Vec<String>,
    },

    /// Envia o template preenchido com os produtos escolhidos
    Send {
        /// E-mail do signatário
        #[arg(short = 'e', long)]
        email: String,

        /// Nome do signatário
        #[arg(short = 'n', long)]
        name: String,

        /// Produto do pedido (pode repetir)
        #[arg(short = 'p', long = "product", required = true)]
        products: Vec<String>,
    },

    /// Lista os documentos de um envelope
    Documents {
        /// ID do envelope
        #[arg(long)]
        envelope_id: String,
    },

    /// Remove o token salvo
    Disconnect,
}

/// Estrutura para resposta padronizada
#[derive(serde::Serialize)]
struct CliResponse {
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl CliResponse {
    fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Erro ao carregar configuração: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&settings.logging.directory, cli.verbose) {
        eprintln!("⚠️ Não foi possível abrir o arquivo de log: {}", e);
    }

    if dotenv_loaded {
        log_info("✅ Arquivo .env carregado com sucesso");
    }
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let result = execute_command(&cli, &settings).await;

    match result {
        Ok(response) => {
            let exit_code = if response.success { 0 } else { 1 };
            output_response(response, &cli.output);
            std::process::exit(exit_code);
        }
        Err(e) => {
            log_error(&format!("❌ {:#}", e));
            eprintln!("❌ Erro: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn execute_command(cli: &Cli, settings: &Settings) -> anyhow::Result<CliResponse> {
    match &cli.command {
        Commands::Connect { no_browser, force } => handle_connect(settings, *no_browser, *force).await,
        Commands::Status => handle_status(settings).await,
        Commands::Products { select } => handle_products(select),
        Commands::Send { email, name, products } => handle_send(settings, email, name, products).await,
        Commands::Documents { envelope_id } => handle_documents(settings, envelope_id).await,
        Commands::Disconnect => handle_disconnect(settings),
    }
}

fn auth_manager(settings: &Settings) -> anyhow::Result<AuthManager> {
    settings.validate()?;
    AuthManager::new(settings.to_esign_config()).context("Falha ao iniciar autenticação")
}

fn token_details(token: &TokenRecord) -> serde_json::Value {
    json!({
        "access_token": token_preview(&token.access_token),
        "token_type": token.token_type,
        "expires_in": token.expires_in,
        "issued_at": token.issued_at.to_rfc3339(),
        "seconds_to_expiry": token.seconds_to_expiry(chrono::Utc::now()),
        "valid": AuthManager::is_valid(Some(token)),
    })
}

/// Token salvo pronto para uso, renovando se necessário
async fn session_token(auth: &AuthManager) -> anyhow::Result<Result<TokenRecord, String>> {
    let Some(saved) = auth.load()? else {
        return Ok(Err("Não conectado. Execute `order-sender connect`".to_string()));
    };

    match auth.ensure_fresh(&saved).await {
        Ok(token) => Ok(Ok(token)),
        Err(e) if e.revokes_authentication() => {
            log_warning(&format!("⚠️ Sessão revogada: {}", e));
            Ok(Err(format!("{}. Execute `order-sender connect` novamente", e)))
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_connect(settings: &Settings, no_browser: bool, force: bool) -> anyhow::Result<CliResponse> {
    let auth = auth_manager(settings)?;

    if !force {
        if let Some(token) = auth.restore_session()? {
            return Ok(CliResponse::success(json!({
                "message": "Já conectado. Use --force para autorizar novamente",
                "token": token_details(&token),
            })));
        }
    }

    let consent_url = auth.consent_url()?;
    println!("🔐 Autorize o acesso à DocuSign:");
    println!("   {}", consent_url);

    if !no_browser {
        if let Err(e) = webbrowser::open(consent_url.as_str()) {
            log_warning(&format!("⚠️ Não foi possível abrir o navegador: {}", e));
        }
    }

    let (port, path) = auth.config().callback_binding()?;
    println!("⏳ Aguardando o retorno em {}...", auth.config().redirect_uri);

    let callback = CallbackServer::new(port, path).start_and_wait().await?;
    let token = auth.exchange_code(&callback.code).await?;

    Ok(CliResponse::success(json!({
        "message": "Conectado à DocuSign",
        "token": token_details(&token),
        "token_path": auth.store().path().display().to_string(),
    })))
}

async fn handle_status(settings: &Settings) -> anyhow::Result<CliResponse> {
    let auth = auth_manager(settings)?;

    match session_token(&auth).await? {
        Ok(token) => Ok(CliResponse::success(json!({
            "authenticated": true,
            "token": token_details(&token),
        }))),
        Err(message) => Ok(CliResponse::error(message)),
    }
}

fn handle_products(select: &[String]) -> anyhow::Result<CliResponse> {
    let catalog = ProductCatalog::standard();
    let products: Vec<_> = catalog
        .products()
        .iter()
        .map(|p| json!({ "name": p.name, "price": p.display_price() }))
        .collect();

    let mut data = json!({ "products": products });

    if !select.is_empty() {
        let selection = OrderSelection::from_names(&catalog, select)?;
        data["selected"] = json!(selection.product_names());
        data["total_amount"] = json!(selection.total_amount());
    }

    Ok(CliResponse::success(data))
}

async fn handle_send(settings: &Settings, email: &str, name: &str, products: &[String]) -> anyhow::Result<CliResponse> {
    let recipient = match Recipient::new(email, name) {
        Ok(recipient) => recipient,
        Err(e) => {
            log_validation_error("recipient", &e.to_string());
            return Ok(CliResponse::error(e.to_string()));
        }
    };
    let selection = OrderSelection::from_names(&ProductCatalog::standard(), products)?;

    let auth = auth_manager(settings)?;
    let token = match session_token(&auth).await? {
        Ok(token) => token,
        Err(message) => return Ok(CliResponse::error(message)),
    };

    let client = EsignClient::new(&token.access_token, &settings.docusign.base_path, &settings.docusign.account_id)?;
    let fulfillment = TemplateFulfillment::new(client, &settings.docusign.account_id, &settings.docusign.template_id);

    log_info(&format!(
        "📤 Enviando template para {} com {} produto(s)",
        recipient.email,
        selection.products().len()
    ));

    match fulfillment.fulfill(&recipient, &selection).await {
        Ok(receipt) => Ok(CliResponse::success(json!({
            "message": "Template enviado com sucesso",
            "envelope_id": receipt.envelope_id,
            "total_amount": receipt.total_amount,
            "products": receipt.products,
        }))),
        Err(e) => Ok(CliResponse::error(describe_failure(&e))),
    }
}

fn describe_failure(error: &AppError) -> String {
    let mut message = match error.step() {
        Some(step) => format!("Falha na etapa de {}: {}", step, error),
        None => error.to_string(),
    };
    if error.requires_reconnect() {
        message.push_str(". Execute `order-sender connect` novamente");
    }
    log_error(&format!("❌ {}", message));
    message
}

async fn handle_documents(settings: &Settings, envelope_id: &str) -> anyhow::Result<CliResponse> {
    let auth = auth_manager(settings)?;
    let token = match session_token(&auth).await? {
        Ok(token) => token,
        Err(message) => return Ok(CliResponse::error(message)),
    };

    let client = EsignClient::new(&token.access_token, &settings.docusign.base_path, &settings.docusign.account_id)?;
    let documents = EnvelopeApi::list_envelope_documents(&client, envelope_id).await?;

    Ok(CliResponse::success(serde_json::to_value(&documents)?))
}

fn handle_disconnect(settings: &Settings) -> anyhow::Result<CliResponse> {
    let auth = auth_manager(settings)?;

    if auth.delete() {
        Ok(CliResponse::success(json!({ "message": "Token removido" })))
    } else {
        Err(anyhow!("Nenhum token salvo em {}", auth.store().path().display()))
    }
}

fn output_response(response: CliResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string(&response)
                .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":\"{}\"}}", e));
            println!("{}", rendered);
        }
        OutputFormat::Pretty => {
            if response.success {
                if let Some(data) = response.data {
                    println!("✅ Sucesso!");
                    println!("{}", serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()));
                }
            } else if let Some(error) = response.error {
                eprintln!("❌ Erro: {}", error);
            }
        }
    }
}
