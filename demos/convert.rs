//! Encode an NFA as a symbolic DFA and decode it back.
//!
//! The automaton accepts the words whose `n`-th symbol from the end is `0`,
//! over the alphabet `0..k`. It has `n + 1` states and a nondeterministic
//! choice in its initial state.
//!
//! Run with:
//! ```bash
//! cargo run --example convert -- 4 --symbols 3 --dot nth.dot
//! ```

use std::path::PathBuf;

use clap::Parser;
use mtbdd_bridge::convert::EncodedNfa;
use mtbdd_bridge::nfa::{ExplicitAutomaton, Nfa, Symbol};
use mtbdd_bridge::timing::Timings;

#[derive(Debug, Parser)]
#[command(author, version, about = "Explicit NFA to symbolic DFA round trip")]
struct Cli {
    /// Position of the marked symbol, counted from the end
    #[arg(default_value = "3")]
    n: usize,

    /// Alphabet size
    #[arg(long, default_value = "2")]
    symbols: usize,

    /// Write the diagram in DOT format to this file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Maximum word length checked for language equivalence
    #[arg(long, default_value = "6")]
    check: usize,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

/// Words of `(0..k)*` whose `n`-th symbol from the end is `0`.
fn nth_from_end(n: usize, k: usize) -> Nfa {
    let mut nfa = Nfa::with_states(n + 1);
    nfa.add_initial_state(0);
    nfa.add_final_state(n);
    for symbol in 0..k {
        nfa.add_transition(0, symbol, 0);
    }
    nfa.add_transition(0, 0, 1);
    for state in 1..n {
        for symbol in 0..k {
            nfa.add_transition(state, symbol, state + 1);
        }
    }
    nfa
}

fn words(k: usize, max_len: usize) -> Vec<Vec<Symbol>> {
    let mut all = vec![Vec::new()];
    let mut last = vec![Vec::new()];
    for _ in 0..max_len {
        last = last
            .iter()
            .flat_map(|word: &Vec<Symbol>| {
                (0..k).map(move |symbol| {
                    let mut next = word.clone();
                    next.push(symbol);
                    next
                })
            })
            .collect();
        all.extend(last.iter().cloned());
    }
    all
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let nfa = nth_from_end(cli.n.max(1), cli.symbols.max(1));
    println!("nfa: {} states, {} transitions", nfa.num_states(), nfa.num_transitions());
    println!("nondeterminism level: {}", nfa.nondeterminism_level());

    let mut timings = Timings::new();
    let encoded = EncodedNfa::from_explicit_timed(&nfa, None, &mut timings)?;
    println!(
        "variables: {} symbol + {} choice = {}",
        encoded.num_alphabet_vars(),
        encoded.num_nondet_vars(),
        encoded.num_vars()
    );
    println!(
        "symbolic dfa: {} states, {} shared nodes",
        encoded.dfa().num_states(),
        encoded.dfa().manager().len()
    );

    if let Some(path) = &cli.dot {
        encoded.save_as_dot(path)?;
        println!("diagram written to {}", path.display());
    }

    let back = timings.time("decode", || encoded.to_explicit::<Nfa>())?;
    println!("decoded nfa: {} states, {} transitions", back.num_states(), back.num_transitions());

    let mut checked = 0;
    for word in words(cli.symbols.max(1), cli.check) {
        if nfa.accepts(&word) != back.accepts(&word) {
            color_eyre::eyre::bail!("languages differ on {:?}", word);
        }
        checked += 1;
    }
    println!("languages agree on {} words", checked);

    for (label, duration) in timings.iter() {
        println!("{:>8}: {:.3} ms", label, duration.as_secs_f64() * 1000.0);
    }
    println!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
