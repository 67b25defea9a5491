use std::fs;
use std::process::ExitCode;

use adql::dialects::{GenericDialect, MysqlDialect, PgSphereDialect, PostgresDialect, SqlServerDialect};
use adql::{translate_adql, AdqlVersion, CheckerConfig, Dialect, FunctionRegistry};
use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "adql-cli")]
#[command(about = "Parse, check and translate one ADQL query against a TableSet XML file", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to an IVOA VODataService `tableset` XML file describing the catalog.
    tableset: String,
    /// The ADQL query to translate.
    query: String,
    #[arg(long, value_enum, default_value_t = DialectArg::Generic)]
    dialect: DialectArg,
    #[arg(long, value_enum, default_value_t = VersionArg::V2_1)]
    adql_version: VersionArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectArg {
    Generic,
    Postgres,
    Pgsphere,
    Mysql,
    Sqlserver,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "verbatim")]
enum VersionArg {
    V2_0,
    V2_1,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let xml = match fs::read_to_string(&cli.tableset) {
        Ok(xml) => xml,
        Err(err) => {
            eprintln!("cannot read \"{}\": {err}", cli.tableset);
            return ExitCode::FAILURE;
        }
    };
    let catalog = match adql::ingest_tableset(&xml) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let registry = FunctionRegistry::new();
    let version = match cli.adql_version {
        VersionArg::V2_0 => AdqlVersion::V2_0,
        VersionArg::V2_1 => AdqlVersion::V2_1,
    };
    let (generic, postgres, pgsphere, mysql, sqlserver);
    let dialect: &dyn Dialect = match cli.dialect {
        DialectArg::Generic => {
            generic = GenericDialect::default();
            &generic
        }
        DialectArg::Postgres => {
            postgres = PostgresDialect::default();
            &postgres
        }
        DialectArg::Pgsphere => {
            pgsphere = PgSphereDialect::default();
            &pgsphere
        }
        DialectArg::Mysql => {
            mysql = MysqlDialect::default();
            &mysql
        }
        DialectArg::Sqlserver => {
            sqlserver = SqlServerDialect::default();
            &sqlserver
        }
    };

    let outcome = translate_adql(&catalog, &registry, &cli.query, version, &CheckerConfig::default(), dialect, None);
    match outcome {
        Ok(Ok(sql)) => {
            println!("{sql}");
            ExitCode::SUCCESS
        }
        Ok(Err(report)) => {
            for error in report.errors() {
                eprintln!("{error}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
