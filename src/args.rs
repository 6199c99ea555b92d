use clap::{Parser, Subcommand, ValueEnum};
use funnel_topics::{AppConfig, BusinessDetails, FunnelStage, RowFilter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "funnel-topics")]
#[command(about = "Generates funnel-stage guest post topics from a business website or guidelines")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Google API key (defaults to GOOGLE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model name, overriding the configuration
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Maximum pages to scrape, start page included
    #[arg(long, global = true)]
    pub max_pages: Option<usize>,

    /// Only scrape the start page
    #[arg(long, global = true)]
    pub no_follow: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape a site and print its page records
    Scrape {
        /// Start URL
        url: String,
    },

    /// Scrape a site and extract a business profile
    Analyze {
        /// Start URL
        url: String,
    },

    /// Generate topics
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Website to scrape and analyze before generating
    #[arg(long)]
    pub url: Option<String>,

    /// File with the full copywriting guidelines
    #[arg(long)]
    pub guidelines_file: Option<PathBuf>,

    /// Client industry or niche
    #[arg(long)]
    pub industry: Option<String>,

    /// Branding tone or voice
    #[arg(long)]
    pub tone: Option<String>,

    /// Target audiences
    #[arg(long)]
    pub audience: Option<String>,

    /// Product or service to highlight
    #[arg(long)]
    pub product: Option<String>,

    /// Date used for timely topics (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Rows)]
    pub format: OutputFormat,

    /// Only keep rows of this funnel stage
    #[arg(long, value_enum)]
    pub stage: Option<StageArg>,

    /// Only keep rows whose audience contains this text
    #[arg(long)]
    pub filter_audience: Option<String>,

    /// Only keep rows whose publication niche contains this text
    #[arg(long)]
    pub filter_publication: Option<String>,

    /// Only keep rows whose product or event contains this text
    #[arg(long)]
    pub filter_subject: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Flattened rows as a JSON array
    Rows,
    /// Flattened rows as JSON lines
    Jsonl,
    /// The nested topic tree as JSON
    Tree,
    /// Indented plain text
    Text,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    Tofu,
    Mofu,
    Bofu,
}

impl From<StageArg> for FunnelStage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Tofu => FunnelStage::ToFu,
            StageArg::Mofu => FunnelStage::MoFu,
            StageArg::Bofu => FunnelStage::BoFu,
        }
    }
}

impl Args {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn load_config(&self) -> funnel_topics::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.scrape.max_pages = max_pages;
        }
        if self.no_follow {
            config.scrape.follow_links = false;
        }
        config.validate()?;
        Ok(config)
    }
}

impl GenerateArgs {
    pub fn business_details(&self) -> funnel_topics::Result<BusinessDetails> {
        let guidelines = match &self.guidelines_file {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };
        Ok(BusinessDetails {
            industry: self.industry.clone().unwrap_or_default(),
            tone: self.tone.clone().unwrap_or_default(),
            audience: self.audience.clone().unwrap_or_default(),
            product: self.product.clone().unwrap_or_default(),
            guidelines,
            ..Default::default()
        })
    }

    pub fn row_filter(&self) -> RowFilter {
        RowFilter {
            stage: self.stage.map(FunnelStage::from),
            audience: self.filter_audience.clone(),
            publication: self.filter_publication.clone(),
            subject: self.filter_subject.clone(),
        }
    }
}
