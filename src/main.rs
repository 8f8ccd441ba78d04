// fundledger console - drive a ledger from stdin, one command per line

use clap::{Parser, Subcommand};
use fundledger::campaign::{Amount, CampaignId, CampaignSnapshot, Expense};
use fundledger::clock::{Clock, ManualClock, SystemClock};
use fundledger::identity::Address;
use fundledger::ledger::{CampaignLedger, LedgerConfig, LedgerError};
use fundledger::transfer::{CustodyAccount, MockTransferChannel, TransferChannel};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fundledger", version, about = "Interactive campaign ledger console")]
struct Cli {
    /// Fail a transfer that takes longer than this
    #[arg(long, default_value_t = 30_000)]
    transfer_timeout_ms: u64,

    /// Initial ledger time in unix seconds (defaults to now)
    #[arg(long)]
    start_time: Option<u64>,

    /// Hold donations in an in-memory custody account instead of a mock channel
    #[arg(long)]
    custody: bool,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a campaign
    Create {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        goal: Amount,
        /// Duration in seconds
        #[arg(long)]
        duration: u64,
        #[arg(long)]
        private: bool,
        #[arg(long)]
        title: String,
        #[arg(required = true, trailing_var_arg = true)]
        description: Vec<String>,
    },
    /// Donate to a campaign
    Donate {
        caller: Address,
        campaign: CampaignId,
        amount: Amount,
    },
    /// Withdraw raised funds after the deadline
    Withdraw {
        caller: Address,
        campaign: CampaignId,
        amount: Amount,
        #[arg(trailing_var_arg = true)]
        description: Vec<String>,
    },
    /// Record an expense without moving funds
    Expense {
        caller: Address,
        campaign: CampaignId,
        amount: Amount,
        #[arg(trailing_var_arg = true)]
        description: Vec<String>,
    },
    /// Show one campaign
    Show { campaign: CampaignId },
    /// List campaigns; with --viewer, hide other people's private campaigns
    List {
        #[arg(long)]
        viewer: Option<Address>,
    },
    /// Campaigns created by an address
    Mine { caller: Address },
    /// Expense trail of a campaign
    Expenses { campaign: CampaignId },
    /// Move the ledger clock forward
    Advance { secs: u64 },
    /// Events after a sequence number
    Events {
        #[arg(default_value_t = 0)]
        after: u64,
    },
    /// Ledger totals
    Stats,
    /// Print a fresh random address
    NewAddress,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let clock = ManualClock::new(cli.start_time.unwrap_or_else(|| SystemClock.now()));
    let channel: Arc<dyn TransferChannel> = if cli.custody {
        Arc::new(CustodyAccount::new())
    } else {
        Arc::new(MockTransferChannel::new())
    };
    let config = LedgerConfig::new().with_transfer_timeout_ms(cli.transfer_timeout_ms);
    let ledger = CampaignLedger::new(config, Arc::new(clock.clone()), channel)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        if matches!(parsed.command, Command::Quit) {
            break;
        }
        if let Err(e) = run(&ledger, &clock, parsed.command).await {
            println!("error: {}", e);
        }
    }

    Ok(())
}

/// Split with shell quoting so `--title "School roof"` stays one argument
fn parse_line(line: &str) -> Result<Line, String> {
    let words = shell_words::split(line).map_err(|e| format!("error: {}", e))?;
    Line::try_parse_from(words).map_err(|e| e.render().to_string())
}

async fn run(ledger: &CampaignLedger, clock: &ManualClock, command: Command) -> Result<(), LedgerError> {
    match command {
        Command::Create {
            caller,
            goal,
            duration,
            private,
            title,
            description,
        } => {
            let id = ledger
                .create_campaign(&caller, &title, &description.join(" "), goal, duration, private)
                .await?;
            println!("created campaign {}", id);
        }
        Command::Donate {
            caller,
            campaign,
            amount,
        } => {
            let receipt = ledger.donate(&caller, campaign, amount).await?;
            println!("donated {} to campaign {} ({})", receipt.amount(), campaign, receipt.transfer_id());
        }
        Command::Withdraw {
            caller,
            campaign,
            amount,
            description,
        } => {
            let receipt = ledger
                .withdraw_funds(&caller, campaign, amount, &description.join(" "))
                .await?;
            println!("withdrew {} from campaign {} ({})", receipt.amount(), campaign, receipt.transfer_id());
        }
        Command::Expense {
            caller,
            campaign,
            amount,
            description,
        } => {
            let expense = ledger
                .record_expense(&caller, campaign, amount, &description.join(" "))
                .await?;
            print_expense(&expense);
        }
        Command::Show { campaign } => {
            let snapshot = ledger.get_campaign(campaign).await?;
            print_campaign(&snapshot, clock.now());
        }
        Command::List { viewer } => {
            let campaigns = match viewer {
                Some(viewer) => ledger.list_visible_campaigns(Some(&viewer)).await,
                None => ledger.list_campaigns().await,
            };
            for snapshot in &campaigns {
                print_campaign(snapshot, clock.now());
            }
        }
        Command::Mine { caller } => {
            for snapshot in &ledger.campaigns_by_creator(&caller).await {
                print_campaign(snapshot, clock.now());
            }
        }
        Command::Expenses { campaign } => {
            for expense in &ledger.list_expenses(campaign).await? {
                print_expense(expense);
            }
        }
        Command::Advance { secs } => {
            let now = clock.advance(secs);
            println!("clock now {}", format_time(now));
        }
        Command::Events { after } => {
            for record in ledger.events().events_since(after).await {
                println!("#{} {:?}", record.sequence, record.event);
            }
        }
        Command::Stats => {
            let stats = ledger.stats().await;
            println!(
                "campaigns={} raised={} spent={} expenses={}",
                stats.campaign_count, stats.total_raised, stats.total_spent, stats.expense_count
            );
        }
        Command::NewAddress => println!("{}", Address::generate()),
        Command::Quit => {}
    }
    Ok(())
}

fn print_campaign(snapshot: &CampaignSnapshot, now: u64) {
    println!(
        "[{}] {} by {} | goal {} raised {} spent {} | {} | {} | ends {} ({}s left)",
        snapshot.id,
        snapshot.title,
        snapshot.creator,
        snapshot.goal_amount,
        snapshot.raised_amount,
        snapshot.spent_amount,
        if snapshot.is_private { "private" } else { "public" },
        if snapshot.is_ended { "ended" } else { "active" },
        format_time(snapshot.end_time),
        snapshot.time_remaining(now),
    );
}

fn print_expense(expense: &Expense) {
    println!(
        "{} {} {}",
        format_time(expense.timestamp()),
        expense.amount(),
        expense.description()
    );
}

fn format_time(unix_secs: u64) -> String {
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| unix_secs.to_string())
}
