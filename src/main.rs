use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;

use femur_mlp::{
    Dataset, Error, FitConfig, LossFunction, NetworkBuilder, NeuralNetwork, ObjMesh,
    network::DEFAULT_SEED,
};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(env_logger::Env::default().filter_or("FEMUR_MLP_LOG", "info"))
        .init();

    let matches = Command::new("femur-mlp")
        .version(clap::crate_version!())
        .about("Train and apply a sigmoid/MSE autoencoder on triangle meshes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train an autoencoder on every .obj mesh in a directory")
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Directory holding the training meshes")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("hidden")
                        .long("hidden")
                        .help("Comma-separated hidden layer sizes")
                        .value_delimiter(',')
                        .num_args(1..)
                        .default_values(["128", "32", "128"])
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("learning_rate")
                        .short('l')
                        .long("learning-rate")
                        .default_value("0.1")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("epochs")
                        .short('e')
                        .long("epochs")
                        .default_value("100")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the weight initializer")
                        .default_value("100")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("File the trained model is written to")
                        .default_value("model.nn")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("loss_history")
                        .long("loss-history")
                        .help("Optional CSV file receiving `epoch,loss` rows")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Do not log per-epoch progress")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("reconstruct")
                .about("Run a mesh through a trained model and write the reconstruction")
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("mesh")
                        .long("mesh")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the architecture of a saved model")
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("reconstruct", sub_m)) => handle_reconstruct(sub_m),
        Some(("inspect", sub_m)) => handle_inspect(sub_m),
        _ => bail!("a subcommand is required"),
    }
}

fn path_arg<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .with_context(|| format!("missing --{id}"))
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let data_dir = path_arg(matches, "data")?;
    let output = path_arg(matches, "output")?;
    let hidden: Vec<usize> = matches
        .get_many::<usize>("hidden")
        .map(|v| v.copied().collect())
        .unwrap_or_default();
    let learning_rate = matches.get_one::<f64>("learning_rate").copied().unwrap_or(0.1);
    let epochs = matches.get_one::<usize>("epochs").copied().unwrap_or(100);
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(DEFAULT_SEED);
    let quiet = matches.get_flag("quiet");

    log::info!("loading meshes from {}", data_dir.display());
    let meshes = ObjMesh::load_dir(data_dir)?;
    if meshes.is_empty() {
        bail!("no .obj meshes found in {}", data_dir.display());
    }
    let samples = meshes.iter().map(ObjMesh::coords_vector::<f64>).collect();
    let data = Dataset::autoencoder(samples).context("meshes must share one vertex count")?;
    log::info!(
        "{} meshes, {} coordinates each",
        data.len(),
        data.input_dim()
    );

    let mut layers = Vec::with_capacity(hidden.len() + 2);
    layers.push(data.input_dim());
    layers.extend(&hidden);
    layers.push(data.input_dim());

    let mut net: NeuralNetwork<f64> = NetworkBuilder::from_sizes(&layers)?
        .learning_rate(learning_rate)?
        .seed(seed)
        .build()?;

    log::info!("training {:?} for {epochs} epochs (lr {learning_rate})", net.layers());
    let report = net.fit(
        &data,
        FitConfig {
            epochs,
            verbose: !quiet,
        },
    )?;
    if let (Some(first), Some(last)) = (report.initial_loss(), report.final_loss()) {
        log::info!("initial loss: {first:.6}");
        log::info!("final loss:   {last:.6}");
    }

    net.save(output)?;

    if let Some(csv_path) = matches.get_one::<PathBuf>("loss_history") {
        let mut csv = String::from("epoch,loss\n");
        for (epoch, loss) in report.losses.iter().enumerate() {
            writeln!(csv, "{},{loss}", epoch + 1)?;
        }
        std::fs::write(csv_path, csv)
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        log::info!("wrote loss history to {}", csv_path.display());
    }

    Ok(())
}

fn handle_reconstruct(matches: &ArgMatches) -> Result<()> {
    let net = NeuralNetwork::<f64>::load(path_arg(matches, "model")?)?;
    let mesh = ObjMesh::load(path_arg(matches, "mesh")?)?;
    let output = path_arg(matches, "output")?;

    let input = mesh.coords_vector::<f64>();
    let reconstructed = net.predict(&input).map_err(Error::from)?;
    let error = net
        .loss()
        .loss(&reconstructed, &input)
        .map_err(Error::from)?;
    log::info!("reconstruction loss: {error:.6}");

    mesh.with_coords_vector(&reconstructed)?.save(output)?;
    Ok(())
}

fn handle_inspect(matches: &ArgMatches) -> Result<()> {
    let net = NeuralNetwork::<f64>::load(path_arg(matches, "model")?)?;
    let params: usize = net
        .weights()
        .iter()
        .zip(net.biases())
        .map(|(w, b)| w.as_slice().len() + b.len())
        .sum();

    log::info!("layers:        {:?}", net.layers());
    log::info!("parameters:    {params}");
    log::info!("learning rate: {}", net.learning_rate());
    log::info!("activation:    {}", net.activation().name());
    log::info!("loss:          {}", net.loss().name());
    Ok(())
}
