use std::env;
use std::path::Path;
use std::time::Instant;

use lu_decomp::config::{Command, PRINT_LIMIT, USAGE};
use lu_decomp::{serial, verify, Backend, BroadcastScope, Matrix, ParallelEliminator};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let command = match Command::from_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            println!("{}", e);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let result = match command {
        Command::Generate { size, output } => generate(size, &output).await,
        Command::Decompose {
            input,
            workers,
            backend,
            scope,
        } => decompose(&input, workers, backend, scope).await,
    };

    if let Err(e) = result {
        println!("{}", e);
    }

    Ok(())
}

async fn generate(size: usize, output: &Path) -> Result<(), lu_decomp::Error> {
    let matrix = Matrix::random(size, &mut rand::thread_rng());
    matrix.save(output).await?;
    println!("Saved {}x{} matrix to {}", size, size, output.display());
    Ok(())
}

async fn decompose(
    input: &Path,
    workers: usize,
    backend: Backend,
    scope: BroadcastScope,
) -> Result<(), lu_decomp::Error> {
    println!("Loading from {}", input.display());
    let matrix = Matrix::load(input).await?;
    info!(rows = matrix.rows(), cols = matrix.cols(), "matrix loaded");

    println!("Input mtx size {}", matrix.rows());
    print_matrix(&matrix);

    println!("===========");
    println!("Gaussian serial");
    let mut serial_result = matrix.clone();
    let start = Instant::now();
    serial::eliminate(&mut serial_result)?;
    let serial_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(elapsed_ms = serial_ms, "serial elimination finished");
    print_matrix(&serial_result);
    println!("Time taken: {:.3}ms", serial_ms);
    println!();

    println!("===========");
    println!("Gaussian parallel ({:?}, {} workers)", backend, workers);
    let eliminator = ParallelEliminator::new(workers)?
        .backend(backend)
        .scope(scope);
    let start = Instant::now();
    let outcome = eliminator.eliminate(&matrix).await?;
    let parallel_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        elapsed_ms = parallel_ms,
        workers = outcome.workers,
        "parallel elimination finished"
    );
    print_matrix(&outcome.matrix);
    println!("Time taken: {:.3}ms", parallel_ms);
    println!();

    if verify::equal(&serial_result, &outcome.matrix) {
        println!("Results match");
    } else {
        println!("Results differ");
    }
    println!("Speedup: {:.3}x", serial_ms / parallel_ms);

    Ok(())
}

fn print_matrix(matrix: &Matrix) {
    if matrix.len() < PRINT_LIMIT {
        print!("{}", matrix);
    }
}
