use clap::Parser;
use grouping_tool::config::PopulationConfig;
use grouping_tool::logger;
use grouping_tool::score::satisfied_wishes;
use grouping_tool::{
    spawn_generation, ChannelProgress, Generator, GroupingError, Partition, Population,
    StrategyKind, WishReport, PARTS_TOTAL,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "grouping-tool", version, about = "希望と拒否リストを考慮したグループ分けツール")]
struct Cli {
    /// Population file (TOML). Names are read from stdin when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Selection strategy
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Preferred subgroup size
    #[arg(long)]
    size: Option<usize>,

    /// Explicit subgroup sizes, e.g. 3,3,2
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Main group sizes, e.g. 10,8
    #[arg(long, value_delimiter = ',')]
    main_groups: Option<Vec<usize>>,

    /// Person who opens the first subgroup (wishlist strategy)
    #[arg(long)]
    start: Option<String>,

    /// Seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Number of alternative proposals to generate
    #[arg(long)]
    proposals: Option<usize>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut PopulationConfig) {
        let generation = &mut config.generation;
        if let Some(strategy) = self.strategy {
            generation.strategy = strategy;
        }
        if let Some(sizes) = &self.sizes {
            generation.subgroup_sizes = Some(sizes.clone());
            generation.subgroup_size = None;
        }
        if let Some(size) = self.size {
            generation.subgroup_size = Some(size);
            generation.subgroup_sizes = None;
        }
        if let Some(main) = &self.main_groups {
            generation.main_group_sizes = Some(main.clone());
        }
        if let Some(start) = &self.start {
            generation.start = Some(start.clone());
        }
        if let Some(seed) = self.seed {
            generation.seed = Some(seed);
        }
        if let Some(proposals) = self.proposals {
            generation.proposals = Some(proposals);
        }
    }
}

const STDIN_FD: libc::c_int = 0;
const STDERR_FD: libc::c_int = 2;

// Check if a standard stream is attached to a terminal
fn is_terminal(fd: libc::c_int) -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(fd) == 1 }
    }

    #[cfg(not(unix))]
    {
        let _ = fd;
        false
    }
}

fn read_names(running: &AtomicBool, interactive: bool) -> io::Result<Vec<String>> {
    if interactive {
        println!("名前を1行に1人ずつ入力してください:");
        println!("  - Ctrl+D (Unix/Mac) または Ctrl+Z+Enter (Windows): 入力を終了してグループ分け");
        println!("  - Ctrl+C: プログラムを終了");
        println!("  - 'delete:名前' と入力すると、その名前を削除できます（例: delete:S001）");
        println!();
    }

    let mut names: Vec<String> = Vec::new();
    for line in io::stdin().lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let name = line?.trim().to_string();
        if name.is_empty() {
            continue;
        }

        if name.to_lowercase().starts_with("delete:") {
            let to_delete = name[7..].trim();
            match names.iter().position(|n| n == to_delete) {
                Some(pos) => {
                    names.remove(pos);
                    if interactive {
                        println!("  ✓ 削除しました: {}", to_delete);
                    }
                }
                None => println!("  ✗ エラー: {} は見つかりませんでした", to_delete),
            }
        } else if names.contains(&name) {
            println!("  ✗ エラー: {} はすでに入力されています", name);
        } else {
            if interactive {
                println!("  追加: {}", name);
            }
            names.push(name);
        }
    }
    Ok(names)
}

fn print_partition(population: &Population, partition: &Partition) {
    let group = &population.group;
    for subgroup in partition.subgroups() {
        println!(
            "グループ {}: {} 人",
            subgroup.label().unwrap_or("?"),
            subgroup.len()
        );
        for &member in subgroup.members() {
            let satisfied = satisfied_wishes(group, partition, member);
            if subgroup.wishlist_mode() && !satisfied.is_empty() {
                let names: Vec<String> = satisfied.iter().map(|&id| group.name_of(id)).collect();
                println!("  - {} (希望: {})", group.name_of(member), names.join(", "));
            } else {
                println!("  - {}", group.name_of(member));
            }
        }
    }

    let report = WishReport::evaluate(group, partition);
    println!("\n合計: {} グループ", partition.len());
    if report.total_wishes > 0 {
        println!("希望達成: {}/{}", report.satisfied, report.total_wishes);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\n\nCtrl+C が押されました。処理を中断します...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut config = match &cli.config {
        Some(path) => PopulationConfig::from_file(path)?,
        None => {
            let interactive = is_terminal(STDIN_FD);
            PopulationConfig::from_names(read_names(&running, interactive)?)
        }
    };
    cli.apply_overrides(&mut config);

    if config.persons.is_empty() {
        println!("\n入力されたデータがありません。");
        return Ok(());
    }
    if !running.load(Ordering::SeqCst) {
        return Ok(());
    }

    let population = match config.build() {
        Ok(population) => population,
        Err(e) => {
            tracing::error!("Configuration rejected: {}", e);
            eprintln!("✗ エラー: {}", e);
            std::process::exit(2);
        }
    };

    let generator = Generator::from_choice(&population.choice).with_proposals(population.proposals);
    let (tx, rx) = mpsc::channel();
    let handle = spawn_generation(
        Arc::new(population.group.clone()),
        population.settings.clone(),
        generator,
        Arc::new(ChannelProgress::new(tx)),
    )?;

    let show_progress = is_terminal(STDERR_FD);
    let mut parts: u64 = 0;
    loop {
        if !running.load(Ordering::SeqCst) {
            handle.interrupt();
        }
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(delta) => {
                parts = (parts + u64::from(delta)).min(u64::from(PARTS_TOTAL));
                if show_progress {
                    eprint!("\r生成中... {:>3}%", parts * 100 / u64::from(PARTS_TOTAL));
                    io::stderr().flush()?;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    if show_progress {
        eprintln!();
    }

    match handle.join() {
        Ok(proposals) if proposals.is_empty() => {
            println!("\nグループ分けは中断されました。");
        }
        Ok(proposals) => {
            println!("\n=== グループ分け結果 ===");
            let numbered = proposals.len() > 1;
            for (i, partition) in proposals.iter().enumerate() {
                if numbered {
                    println!("\n--- 案 {} ---", i + 1);
                }
                print_partition(&population, partition);
            }
        }
        Err(e @ GroupingError::Unsatisfiable { .. }) => {
            eprintln!("✗ 拒否リストを満たすグループ分けが見つかりませんでした: {}", e);
            eprintln!("  別の方法を選ぶか、もう一度実行してください。");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
