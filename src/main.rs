use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::{info, LevelFilter};
use rand::distributions::Alphanumeric;
use rand::Rng;

use rusty_chains::error::{ChainError, Result};
use rusty_chains::hash_table::{Config, HashFunction, HashMap};
use rusty_chains::suggest::{Suggester, Verdict};
use rusty_chains::words::{self, Words};

/// Word counts and spelling suggestions on a separately chained hash table
#[derive(Parser, Debug)]
#[command(name = "rusty_chains")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Initial number of buckets
    #[arg(
        long,
        env = "RUSTY_CHAINS_CAPACITY",
        default_value_t = 10,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    capacity: usize,

    /// Load factor above which the table doubles
    #[arg(
        long = "max-load",
        default_value_t = HashMap::<usize>::MAX_LOAD_FACTOR,
        value_parser = parse_max_load
    )]
    max_load: f64,

    /// Hash function used to pick buckets
    #[arg(long, value_enum, default_value_t = HashArg::Fibonacci)]
    hash: HashArg,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }

    fn config(&self) -> Config {
        Config {
            initial_capacity: self.capacity,
            max_load_factor: self.max_load,
            hash_function: self.hash.into(),
        }
    }
}

fn parse_max_load(s: &str) -> std::result::Result<f64, String> {
    let load: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if load.is_finite() && load > 0.0 {
        Ok(load)
    } else {
        Err(format!("`{s}` must be a positive, finite load factor"))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum HashArg {
    CharSum,
    WeightedCharSum,
    Fibonacci,
}

impl From<HashArg> for HashFunction {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::CharSum => HashFunction::CharSum,
            HashArg::WeightedCharSum => HashFunction::WeightedCharSum,
            HashArg::Fibonacci => HashFunction::Fibonacci,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count every word of a file and print the table
    Concordance {
        /// Text file to count
        file: PathBuf,
    },

    /// Check words against a dictionary and suggest corrections
    Check {
        /// Dictionary file, any whitespace separated word list
        #[arg(short, long, default_value = "dictionary.txt")]
        dictionary: PathBuf,

        /// Suggestions per misspelled word
        #[arg(
            short = 'n',
            long,
            default_value_t = 5,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        suggestions: usize,

        /// Words to check. Reads standard input when none are given
        words: Vec<String>,
    },

    /// Time inserts, lookups and removals of random keys
    Bench {
        /// Number of random keys
        #[arg(short, long, default_value_t = 100_000)]
        samples: usize,
    },
}

fn main() {
    let args: Args = Args::parse();

    let log_level: LevelFilter = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let config: Config = args.config();
    let outcome: Result<()> = match args.command {
        Command::Concordance { file } => run_concordance(config, &file),
        Command::Check {
            dictionary,
            suggestions,
            words,
        } => run_check(config, &dictionary, suggestions, &words),
        Command::Bench { samples } => run_bench(config, samples),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn open_words(path: &Path) -> Result<Words<BufReader<File>>> {
    info!("opening file: {}", path.display());
    Ok(Words::new(BufReader::new(File::open(path)?)))
}

fn run_concordance(config: Config, file: &Path) -> Result<()> {
    let now: Instant = Instant::now();
    let mut map: HashMap<usize> = HashMap::with_config(config);
    words::concordance(open_words(file)?, &mut map)?;
    print!("{}", map);
    let elapsed: Duration = now.elapsed();

    println!();
    println!("Ran in {:.6} seconds", elapsed.as_secs_f64());
    println!("{}", map.stats());
    Ok(())
}

fn run_check(config: Config, dictionary: &Path, count: usize, queries: &[String]) -> Result<()> {
    let now: Instant = Instant::now();
    let mut map: HashMap<usize> = HashMap::with_config(config);
    words::load_dictionary(open_words(dictionary)?, &mut map)?;
    println!(
        "Dictionary loaded in {:.6} seconds",
        now.elapsed().as_secs_f64()
    );

    let suggester: Suggester = Suggester::new(count);
    if !queries.is_empty() {
        for query in queries {
            report(&suggester, &map, query);
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nEnter a word or \"quit\" to quit: ");
        io::stdout().flush()?;
        let line: String = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let query: &str = line.trim();
        if query == "quit" {
            break;
        }
        report(&suggester, &map, query);
    }
    Ok(())
}

fn report(suggester: &Suggester, map: &HashMap<usize>, query: &str) {
    let word: String = match words::validate_query(query) {
        Ok(word) => word,
        Err(_) => {
            println!("Invalid input. Enter one word, lowercase and uppercase letters only.");
            return;
        }
    };
    match suggester.check(map, &word) {
        Verdict::Correct => println!("The inputted word {} is spelled correctly.", word),
        Verdict::Misspelled(suggestions) => {
            println!("The inputted word {} is spelled incorrectly.", word);
            if suggestions.is_empty() {
                return;
            }
            println!("Did you mean...?");
            for s in suggestions {
                println!("{} ({})", s.word, s.distance);
            }
        }
    }
}

fn random_keys(samples: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..samples)
        .map(|_| {
            let len: usize = rng.gen_range(3..12);
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect()
}

/// Puts every key with its position as value, stopping at the first failure.
/// Returns how many keys went in.
fn insert_all(map: &mut HashMap<usize>, keys: &[String]) -> usize {
    for (i, key) in keys.iter().enumerate() {
        if map.put(key, i).is_err() {
            return i;
        }
    }
    keys.len()
}

fn filled(config: Config, keys: &[String]) -> HashMap<usize> {
    let mut map: HashMap<usize> = HashMap::with_config(config);
    insert_all(&mut map, keys);
    map
}

fn per_key(total: Duration, samples: usize) -> f64 {
    total.as_nanos() as f64 / samples.max(1) as f64
}

fn run_bench(config: Config, samples: usize) -> Result<()> {
    let keys: Vec<String> = random_keys(samples);
    benchmarking::warm_up();

    let insert_keys: Vec<String> = keys.clone();
    let inserts = benchmarking::measure_function(move |measurer| {
        let mut map: HashMap<usize> = HashMap::with_config(config);
        measurer.measure(|| insert_all(&mut map, &insert_keys));
        map
    })
    .map_err(|e| ChainError::benchmark(format!("{:?}", e)))?;

    let map: HashMap<usize> = filled(config, &keys);
    println!("Initial capacity {} actual capacity {}", config.initial_capacity, map.capacity());
    println!("Initial entries {} actual entries {}", samples, map.size());
    println!("Load factor {}", map.load_factor());
    println!("Avg time to insert {} ns", per_key(inserts.elapsed(), samples));

    let lookup_keys: Vec<String> = keys.clone();
    let lookups = benchmarking::measure_function(move |measurer| {
        measurer.measure(|| lookup_keys.iter().filter(|k| map.contains_key(k)).count())
    })
    .map_err(|e| ChainError::benchmark(format!("{:?}", e)))?;
    println!("Avg time to lookup {} ns", per_key(lookups.elapsed(), samples));

    let remove_keys: Vec<String> = keys;
    let removes = benchmarking::measure_function(move |measurer| {
        let mut map: HashMap<usize> = filled(config, &remove_keys);
        measurer.measure(|| {
            for key in remove_keys.iter() {
                map.remove(key);
            }
        });
        map.size()
    })
    .map_err(|e| ChainError::benchmark(format!("{:?}", e)))?;
    println!("Avg time to delete {} ns", per_key(removes.elapsed(), samples));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_load() {
        assert_eq!(parse_max_load("0.75").unwrap(), 0.75);
        assert!(parse_max_load("0").is_err());
        assert!(parse_max_load("-1").is_err());
        assert!(parse_max_load("inf").is_err());
        assert!(parse_max_load("NaN").is_err());
        assert!(parse_max_load("lots").is_err());
    }

    #[test]
    fn test_bad_max_load_is_a_usage_error() {
        let parsed = Args::try_parse_from(["rusty_chains", "--max-load", "0", "check", "cat"]);
        assert!(parsed.is_err());

        let args: Args =
            Args::try_parse_from(["rusty_chains", "--max-load", "1.5", "check", "cat"]).unwrap();
        assert_eq!(args.config().max_load_factor, 1.5);
    }

    #[test]
    fn test_suggestion_count_must_be_positive() {
        assert!(Args::try_parse_from(["rusty_chains", "check", "-n", "0", "cat"]).is_err());
        match Args::try_parse_from(["rusty_chains", "check", "-n", "2", "cat"]).unwrap().command {
            Command::Check { suggestions, words, .. } => {
                assert_eq!(suggestions, 2);
                assert_eq!(words, vec!["cat".to_string()]);
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_all() {
        let keys: Vec<String> = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let mut map: HashMap<usize> = HashMap::with_capacity(2);
        assert_eq!(insert_all(&mut map, &keys), 3);
        assert_eq!(map.size(), 2);
        assert_eq!(map.get("a"), Some(&2));

        let random: Vec<String> = random_keys(50);
        let map: HashMap<usize> = filled(Config::default(), &random);
        assert!(random.iter().all(|k| map.contains_key(k)));
    }

    #[test]
    fn test_defaults() {
        let args: Args = Args::try_parse_from(["rusty_chains", "bench"]).unwrap();
        let config: Config = args.config();
        assert_eq!(config.initial_capacity, 10);
        assert_eq!(config.max_load_factor, HashMap::<usize>::MAX_LOAD_FACTOR);
        assert_eq!(config.hash_function, HashFunction::Fibonacci);
        assert!(Args::try_parse_from(["rusty_chains", "--capacity", "0", "bench"]).is_err());
    }
}
