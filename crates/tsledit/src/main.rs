#![forbid(unsafe_code)]

//! tsledit CLI: create, sign, verify and inspect Trust Service Status Lists.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use time::OffsetDateTime;
use tsledit_c14n::C14nMode;
use tsledit_core::{algorithm, Error};
use tsledit_keys::{x509, Key, KeyProvider, PemDirectoryProvider, ProviderSession};
use tsledit_list::service::status;
use tsledit_list::{CountryProfile, EuCountry, SignatureConfig, SignatureStatus, TrustList};

#[derive(Parser)]
#[command(
    name = "tsledit",
    about = "Edit, sign and verify ETSI Trust Service Status Lists",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an unsigned list from a country profile
    Create {
        /// Country profile
        #[arg(long, value_enum, default_value = "be")]
        profile: Profile,

        /// CA certificate of the next profile service (PEM or DER, repeatable)
        #[arg(long = "service-cert")]
        service_certs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Sign a list with an enveloped XAdES-BES signature
    Sign {
        /// Input list
        input: PathBuf,

        /// Private key (PEM)
        #[arg(short = 'k', long, requires = "cert", conflicts_with = "key_dir")]
        key: Option<PathBuf>,

        /// Signer certificate (PEM or DER)
        #[arg(long)]
        cert: Option<PathBuf>,

        /// Directory of NAME.pem/NAME.crt pairs
        #[arg(long = "key-dir", requires = "alias")]
        key_dir: Option<PathBuf>,

        /// Key alias inside --key-dir
        #[arg(long)]
        alias: Option<String>,

        /// Reference digest algorithm
        #[arg(long, value_enum, default_value = "sha256")]
        digest: Digest,

        /// Canonicalize with comments
        #[arg(long = "with-comments")]
        with_comments: bool,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify the signature of a list
    Verify {
        /// Input list
        input: PathBuf,
    },

    /// Print the content of a list
    Info {
        /// Input list
        input: PathBuf,
    },

    /// Print the EU member state table
    Countries,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Be,
}

#[derive(Clone, Copy, ValueEnum)]
enum Digest {
    Sha1,
    Sha256,
}

impl Digest {
    fn uri(self) -> &'static str {
        match self {
            Digest::Sha1 => algorithm::SHA1,
            Digest::Sha256 => algorithm::SHA256,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create {
            profile,
            service_certs,
            output,
        } => cmd_create(profile, service_certs, output),

        Commands::Sign {
            input,
            key,
            cert,
            key_dir,
            alias,
            digest,
            with_comments,
            output,
        } => cmd_sign(input, key, cert, key_dir, alias, digest, with_comments, output),

        Commands::Verify { input } => cmd_verify(input),

        Commands::Info { input } => cmd_info(input),

        Commands::Countries => cmd_countries(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn cmd_create(profile: Profile, service_certs: Vec<PathBuf>, output: PathBuf) -> Result<(), Error> {
    let profile = match profile {
        Profile::Be => CountryProfile::belgium(),
    };
    let mut list = TrustList::new();
    profile.apply(&mut list, OffsetDateTime::now_utc())?;

    let service_profiles: Vec<_> = profile
        .providers
        .iter()
        .enumerate()
        .flat_map(|(idx, p)| p.services.iter().map(move |s| (idx, s)))
        .collect();
    if service_certs.len() > service_profiles.len() {
        return Err(Error::InvalidInput(format!(
            "profile has {} service(s), got {} certificate(s)",
            service_profiles.len(),
            service_certs.len()
        )));
    }
    for (path, (provider_idx, service_profile)) in service_certs.iter().zip(service_profiles) {
        let cert = tsledit_keys::loader::load_certificate_file(path)?;
        let service = service_profile.build(&[cert])?;
        if let Some(provider) = list.trust_service_provider_mut(provider_idx) {
            provider.add_trust_service(service);
        }
        eprintln!("Added service: {}", service_profile.label);
    }

    list.save(&output)?;
    println!("Created: {}", output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_sign(
    input: PathBuf,
    key: Option<PathBuf>,
    cert: Option<PathBuf>,
    key_dir: Option<PathBuf>,
    alias: Option<String>,
    digest: Digest,
    with_comments: bool,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let key = match (key, cert, key_dir, alias) {
        (Some(key), Some(cert), _, _) => tsledit_keys::loader::load_signing_identity(&key, &cert)?,
        (_, _, Some(dir), Some(alias)) => key_from_directory(&dir, &alias)?,
        _ => {
            return Err(Error::InvalidInput(
                "either --key and --cert or --key-dir and --alias are required".into(),
            ))
        }
    };
    let certificate = signer_certificate(&key)?;

    let mut config = SignatureConfig::default().with_digest_method(digest.uri());
    if with_comments {
        config = config.with_c14n(C14nMode::ExclusiveWithComments);
    }

    let mut list = TrustList::load(&input)?;
    list.sign_with(&key, &certificate, &config)?;
    let output = output.unwrap_or(input);
    list.save(&output)?;
    println!("Signed: {}", output.display());
    Ok(())
}

fn cmd_verify(input: PathBuf) -> Result<(), Error> {
    let list = TrustList::load(&input)?;
    let status = list.verify_integrity_only();
    for line in verify_report(&status, list.signing_time())? {
        println!("{line}");
    }
    match status {
        SignatureStatus::Invalid { reason } => Err(Error::SignatureInvalid(reason)),
        _ => Ok(()),
    }
}

fn cmd_info(input: PathBuf) -> Result<(), Error> {
    let list = TrustList::load(&input)?;

    println!("Scheme name:     {}", list.scheme_name("en").unwrap_or("-"));
    println!("Territory:       {}", list.scheme_territory().unwrap_or("-"));
    println!("Operator:        {}", list.scheme_operator_name("en").unwrap_or("-"));
    println!("Sequence number: {}", list.sequence_number());
    println!("Issued:          {}", date_or_dash(list.list_issue_date_time())?);
    println!("Next update:     {}", date_or_dash(list.next_update())?);
    println!("Signed:          {}", if list.has_signature() { "yes" } else { "no" });

    for provider in list.trust_service_providers() {
        println!();
        println!("Provider: {}", provider.name("en").unwrap_or("-"));
        for service in &provider.services {
            println!("  Service: {}", service.name("en").unwrap_or("-"));
            println!("    Status: {}", status::short_name(&service.status));
            println!("    Since:  {}", date_or_dash(service.status_starting_time)?);
            for qualification in &service.qualifications {
                let oids: Vec<_> = qualification.oids().collect();
                println!("    Qualification: {}", oids.join(", "));
            }
        }
    }
    Ok(())
}

fn cmd_countries() -> Result<(), Error> {
    for country in EuCountry::ALL {
        println!(
            "{}  {}  {:<18} {:<20} {}",
            country.territory_code(),
            country.iso_code(),
            country.short_english_name(),
            country.short_src_lang_name(),
            country.official_english_name()
        );
    }
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

/// Lines printed by `verify` for a signature status.
fn verify_report(
    status: &SignatureStatus,
    signing_time: Option<OffsetDateTime>,
) -> Result<Vec<String>, Error> {
    let lines = match status {
        SignatureStatus::Valid(cert) => {
            let der = x509::to_der(cert)?;
            vec![
                "Valid".to_owned(),
                format!("  Subject:   {}", x509::subject_name(cert)),
                format!("  Issuer:    {}", x509::issuer_name(cert)),
                format!("  Serial:    {}", x509::serial_decimal(cert)),
                format!("  SHA-1:     {}", x509::fingerprint(&der, algorithm::SHA1)?),
                format!("  SHA-256:   {}", x509::fingerprint(&der, algorithm::SHA256)?),
                format!("  Signed at: {}", date_or_dash(signing_time)?),
            ]
        }
        SignatureStatus::Invalid { .. } => vec!["Invalid".to_owned()],
        SignatureStatus::Unsigned => vec!["Unsigned".to_owned()],
        SignatureStatus::NotVerifiable => vec!["Not verifiable".to_owned()],
    };
    Ok(lines)
}

fn key_from_directory(dir: &Path, alias: &str) -> Result<Key, Error> {
    let mut provider = PemDirectoryProvider::new(dir);
    let session = ProviderSession::open(&mut provider)?;
    log::debug!("using key {alias} from {}", dir.display());
    session.private_key(alias)
}

fn signer_certificate(key: &Key) -> Result<Vec<u8>, Error> {
    key.x509_chain
        .first()
        .cloned()
        .ok_or_else(|| Error::Certificate("signing key has no certificate".into()))
}

fn date_or_dash(t: Option<OffsetDateTime>) -> Result<String, Error> {
    match t {
        Some(t) => tsledit_xml::datetime::format(t),
        None => Ok("-".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../test-data/keys")
            .join(name)
    }

    #[test]
    fn statuses_are_reported_as_they_are() {
        assert_eq!(
            verify_report(&SignatureStatus::NotVerifiable, None).unwrap(),
            ["Not verifiable"]
        );
        assert_eq!(verify_report(&SignatureStatus::Unsigned, None).unwrap(), ["Unsigned"]);
        let invalid = SignatureStatus::Invalid {
            reason: "digest mismatch".into(),
        };
        assert_eq!(verify_report(&invalid, None).unwrap(), ["Invalid"]);
    }

    #[test]
    fn verify_returns_an_error_for_a_tampered_list() {
        let key_path = fixture("operator-ec.pem");
        let cert_path = fixture("operator-ec.crt");
        if !key_path.exists() || !cert_path.exists() {
            eprintln!("Skipping test: fixture not found at {}", key_path.display());
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsl.xml");
        let key = tsledit_keys::loader::load_signing_identity(&key_path, &cert_path).unwrap();
        let cert = key.x509_chain[0].clone();

        let mut list = TrustList::new();
        list.set_scheme_name("en", "BE:Test");
        list.sign(&key, &cert).unwrap();
        list.save(&path).unwrap();

        let reloaded = TrustList::load(&path).unwrap();
        let report = verify_report(&reloaded.verify_integrity_only(), reloaded.signing_time()).unwrap();
        assert_eq!(report[0], "Valid");
        let signed_at = report.last().unwrap();
        assert!(signed_at.starts_with("  Signed at: 20"), "{signed_at}");
        assert!(cmd_verify(path.clone()).is_ok());

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replace(">BE:Test<", ">BE:Forged<")).unwrap();
        assert!(matches!(cmd_verify(path), Err(Error::SignatureInvalid(_))));
    }
}
