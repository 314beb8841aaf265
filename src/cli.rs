use clap::{Parser, Subcommand, ValueEnum};
use radar::{BlipScale, Category, Priority};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "radar", version, about = "Terminal urgency radar for tasks, events and notes")]
pub struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize an item store in the current directory
    Init {
        /// Optional store name
        #[arg(long)]
        name: Option<String>,
    },
    /// Add an item
    Add {
        /// Title of the item
        title: String,
        /// What kind of item this is
        #[arg(long, value_enum, default_value_t = KindArg::Task)]
        kind: KindArg,
        /// Due date (tasks), start (events) or creation time (notes)
        #[arg(long)]
        at: Option<String>,
        /// Priority
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
    },
    /// List open items with their current urgency band
    List,
    /// Print one layout pass as YAML
    Layout {
        /// Evaluate at this time instead of now
        #[arg(long)]
        at: Option<String>,
        /// Blip size preset
        #[arg(long, value_enum, default_value_t = ScaleArg::Medium)]
        scale: ScaleArg,
    },
    /// Mark an item as done
    Done {
        /// Item id
        item_id: String,
    },
    /// Launch the interactive radar
    Show,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Task,
    Event,
    Note,
    Inbox,
    Project,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScaleArg {
    Small,
    Medium,
    Large,
}

impl From<KindArg> for Category {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Task => Category::Task,
            KindArg::Event => Category::Event,
            KindArg::Note => Category::Note,
            KindArg::Inbox => Category::Inbox,
            KindArg::Project => Category::Project,
        }
    }
}

impl From<PriorityArg> for Priority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

impl From<ScaleArg> for BlipScale {
    fn from(s: ScaleArg) -> Self {
        match s {
            ScaleArg::Small => BlipScale::Small,
            ScaleArg::Medium => BlipScale::Medium,
            ScaleArg::Large => BlipScale::Large,
        }
    }
}
