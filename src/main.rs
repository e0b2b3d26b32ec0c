// Command-line front end: run the chain server, call a pipeline, or ask the chatbot
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Error};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, LevelFilter};

use prompt_relay::catalog::{self, text_chain};
use prompt_relay::config::DEFAULT_CONFIG_FILE;
use prompt_relay::{
    ChainServer, ChatModel, Dispatcher, LoggingCallbackHandler, OllamaModel, OpenAIChatModel, RelayConfig, Runnable,
    SharedChain,
};

#[derive(Parser)]
#[command(name = "prompt-relay", version, about = "Story, poem and chatbot pipelines over HTTP")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the built-in pipelines at /story/invoke and /poem/invoke
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fill a built-in pipeline with TOPIC and dispatch it to the chain server
    Generate {
        /// story | poem
        pipeline: String,
        topic: String,
        /// Overrides client.base_url
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Ask the chatbot a question directly against a model backend
    Ask {
        question: String,
        #[arg(long, value_enum, default_value_t = Backend::Ollama)]
        backend: Backend,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Ollama,
    Openai,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = RelayConfig::from_file(&cli.config)?;

    match cli.command {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Generate {
            pipeline,
            topic,
            base_url,
        } => generate(config, &pipeline, topic, base_url).await,
        Command::Ask { question, backend } => ask(config, question, backend).await,
    }
}

async fn serve(mut config: RelayConfig, host: Option<String>, port: Option<u16>) -> Result<(), Error> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let ollama = &config.ollama;
    let mut server = ChainServer::new(config.server.title.clone());
    for definition in catalog::ROUTES.iter() {
        let model_name = match definition.name {
            "story" => &ollama.story_model,
            _ => &ollama.poem_model,
        };
        info!("Route {} -> ollama model {}", definition.route, model_name);

        let template = definition.template()?;
        let input_variables = template.input_variables();
        let chain: SharedChain = Arc::new(text_chain(template, OllamaModel::new(&ollama.base_url, model_name)));
        server = server.add_routes(definition.route, chain, input_variables);
    }

    if config.tracing.enabled {
        info!("Tracing enabled (api key {})", if config.tracing.api_key.is_some() { "set" } else { "not set" });
        server = server.with_callbacks(Arc::new(LoggingCallbackHandler::new(config.tracing.project.clone())));
    }

    server.serve(&config.server_address()).await?;
    Ok(())
}

async fn generate(config: RelayConfig, name: &str, topic: String, base_url: Option<String>) -> Result<(), Error> {
    let definition = catalog::route(name).ok_or_else(|| {
        let known: Vec<&str> = catalog::ROUTES.iter().map(|d| d.name).collect();
        anyhow!("unknown pipeline `{}` (available: {})", name, known.join(", "))
    })?;
    let base_url = base_url.unwrap_or_else(|| config.client.base_url.clone());
    let pipeline = definition.pipeline(&base_url)?;

    let mut values = HashMap::new();
    for variable in pipeline.template().input_variables() {
        values.insert(variable, topic.clone());
    }

    let dispatcher = Dispatcher::new(config.dispatcher_config());
    match pipeline.run(&dispatcher, &values).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) if e.is_transport() => {
            error!("Request to {} could not complete: {}", pipeline.endpoint(), e);
            Err(anyhow!("the {} request could not complete, is the server at {} running?", name, base_url))
        }
        Err(e) => Err(e.into()),
    }
}

async fn ask(config: RelayConfig, question: String, backend: Backend) -> Result<(), Error> {
    let prompt = catalog::chatbot_prompt()?;
    let chain = match backend {
        Backend::Ollama => {
            let model = OllamaModel::new(&config.ollama.base_url, &config.ollama.chat_model);
            info!("Chatbot using ollama model {} at {}", model.model_name(), model.base_url());
            text_chain(prompt, model)
        }
        Backend::Openai => {
            let api_key = config
                .openai
                .api_key
                .clone()
                .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;
            let mut model = OpenAIChatModel::new(api_key, Some(config.openai.base_url.clone()))
                .with_model(config.openai.model.clone());
            if let Some(temperature) = config.openai.temperature {
                model = model.with_temperature(temperature);
            }
            if let Some(max_tokens) = config.openai.max_tokens {
                model = model.with_max_tokens(max_tokens);
            }
            info!("Chatbot using OpenAI model {} at {}", model.model_name(), model.base_url());
            text_chain(prompt, model)
        }
    };

    let mut values = HashMap::new();
    values.insert("question".to_string(), question);
    let answer = chain.invoke(values).await?;
    println!("{}", answer);
    Ok(())
}
