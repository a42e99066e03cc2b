use axon::*;

/// A single thread id: the harness models one hardware thread in program
/// order, so every record resolves before the next branch is predicted.
const TID: usize = 0;

fn main() {
    env_logger::init();

    let cfg = PerceptronConfig {
        num_threads: 1,
        predictor_size: 4096,
        shift_amt: 2,
    };
    let mut predictor = match cfg.build() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[!] {}", e);
            std::process::exit(1);
        }
    };

    let mut builder = TraceBuilder::new(0x5eed);
    for round in 0..64 {
        builder
            .loop_branch(0x0000_1008, 16, 4)
            .biased_branch(0x0000_1104, 0.90, 32)
            .unconditional(0x0000_1204, 8)
            .alternating_branch(0x0000_1308, 32)
            .biased_branch(0x0000_1404 + (round % 8) * 0x40, 0.5, 8);
    }
    let trace = builder.build();

    println!(
        "[*] Evaluating {} records ({} entries, {} history bits)",
        trace.num_entries(),
        predictor.table().size(),
        predictor.history_bits()
    );

    let mut stats = PredictorStats::new();
    for record in trace.records() {
        if !record.is_conditional() {
            let r = predictor.predict_unconditional(TID, record.pc);
            predictor.resolve(TID, record.pc, Outcome::T, false, r);
            continue;
        }

        let (prediction, r) = predictor.predict(TID, record.pc);
        stats.record(record, prediction);

        // A mispredicted branch squashes the speculative history update;
        // a correct one commits a training step.
        let squashed = prediction != record.outcome;
        predictor.resolve(TID, record.pc, record.outcome, squashed, r);
    }

    println!(
        "[*] Global hit rate: {}/{} ({:.2}% correct) ({} misses)",
        stats.hits(),
        stats.lookups(),
        stats.hit_rate() * 100.0,
        stats.misses()
    );

    println!("[*] Worst-predicted branches:");
    for (pc, data) in stats.worst_predicted(5) {
        println!(
            "    {:#010x}: {:6} occurrences, {:5} taken, {:.2}% correct",
            pc,
            data.occ,
            data.times_taken(),
            data.hit_rate() * 100.0
        );
    }
}
