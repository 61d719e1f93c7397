//! Load/edit/sign/save/verify lifecycle of trust lists.

use pretty_assertions::assert_eq;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SerialNumber};
use std::path::PathBuf;
use time::{Duration, OffsetDateTime};
use tsledit_core::{algorithm, Error};
use tsledit_keys::{x509, Key};
use tsledit_list::service::qualifier;
use tsledit_list::{
    fingerprint, CountryProfile, DigitalIdentity, SignatureConfig, SignatureStatus, TrustList,
    TrustService, TrustServiceProvider,
};

/// A fresh P-256 key with a self-signed one-year certificate.
fn identity(cn: &str, serial: u64) -> (Key, Vec<u8>) {
    let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CountryName, "BE");
    params.distinguished_name.push(DnType::CommonName, cn);
    params.serial_number = Some(SerialNumber::from(serial));
    let now = OffsetDateTime::now_utc();
    params.not_before = now - Duration::minutes(5);
    params.not_after = now + Duration::days(365);
    let cert = params.self_signed(&key_pair).unwrap();

    let key = tsledit_keys::loader::load_private_key_pem(key_pair.serialize_pem().as_bytes()).unwrap();
    (key, cert.der().to_vec())
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-data/keys")
        .join(name)
}

fn tsl_fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-data/tsl")
        .join(name)
}

fn signed_der(list: &TrustList) -> Vec<u8> {
    let cert = list.verify().expect("list should verify");
    x509::to_der(&cert).unwrap()
}

#[test]
fn be_test_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Test Scheme Operator", 0x2a);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.set_scheme_territory("BE");
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    assert_eq!(reloaded.scheme_name("en"), Some("BE:Test"));
    let signer = reloaded.verify().unwrap();
    assert_eq!(x509::serial_decimal(&signer), "42");
    assert_eq!(x509::to_der(&signer).unwrap(), cert);
}

#[test]
fn sign_then_verify_in_memory() {
    let (key, cert) = identity("Operator", 1);
    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();

    assert!(list.has_changed());
    assert!(list.has_signature());
    assert!(list.id().unwrap().starts_with("tsl-"));
    assert_eq!(signed_der(&list), cert);
    assert!(matches!(list.verify_integrity_only(), SignatureStatus::Valid(_)));
}

#[test]
fn output_has_no_xml_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 1);
    let mut list = TrustList::new();
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();
    assert!(!list.has_changed());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<tsl:TrustServiceStatusList "));
    assert_eq!(text.matches("<ds:Signature ").count(), 1);
}

#[test]
fn verification_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 3);
    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    let first = reloaded.verify_integrity_only();
    let second = reloaded.verify_integrity_only();
    assert_eq!(first, second);
    assert_eq!(reloaded.verify(), reloaded.verify());
    assert!(!reloaded.has_changed());
}

#[test]
fn resigning_replaces_the_signature() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (first_key, first_cert) = identity("First Operator", 10);
    let (second_key, second_cert) = identity("Second Operator", 20);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&first_key, &first_cert).unwrap();
    let first_id = list.id().unwrap().to_owned();
    list.sign(&second_key, &second_cert).unwrap();
    assert_eq!(list.id(), Some(first_id.as_str()));
    list.save(&path).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    assert_eq!(signed_der(&reloaded), second_cert);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("<ds:Signature ").count(), 1);
}

#[test]
fn resigning_a_loaded_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (first_key, first_cert) = identity("First Operator", 10);
    let (second_key, second_cert) = identity("Second Operator", 20);

    let mut list = TrustList::new();
    list.sign(&first_key, &first_cert).unwrap();
    list.save(&path).unwrap();

    let mut reloaded = TrustList::load(&path).unwrap();
    reloaded.sign(&second_key, &second_cert).unwrap();
    reloaded.save(&path).unwrap();
    assert_eq!(signed_der(&TrustList::load(&path).unwrap()), second_cert);
}

#[test]
fn signing_after_a_mutation_uses_a_fresh_id() {
    let (key, cert) = identity("Operator", 21);
    let mut list = TrustList::new();
    list.sign(&key, &cert).unwrap();
    let first_id = list.id().unwrap().to_owned();

    list.set_sequence_number(2);
    list.sign(&key, &cert).unwrap();
    assert_ne!(list.id(), Some(first_id.as_str()));
    assert_eq!(signed_der(&list), cert);
}

#[test]
fn mutation_after_signing_drops_the_signature() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 5);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();
    list.set_scheme_name("en", "BE:Changed");
    assert!(!list.has_signature());
    assert_eq!(list.verify_integrity_only(), SignatureStatus::NotVerifiable);
    list.save(&path).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    assert_eq!(reloaded.scheme_name("en"), Some("BE:Changed"));
    assert_eq!(reloaded.verify_integrity_only(), SignatureStatus::Unsigned);
    assert!(reloaded.verify().is_none());
}

#[test]
fn tampered_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 6);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, text.replace(">BE:Test<", ">BE:Forged<")).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    assert_eq!(reloaded.scheme_name("en"), Some("BE:Forged"));
    assert!(matches!(
        reloaded.verify_integrity_only(),
        SignatureStatus::Invalid { .. }
    ));
    assert!(reloaded.verify().is_none());
}

#[test]
fn sha1_configuration_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 7);
    let config = SignatureConfig::default().with_digest_method(algorithm::SHA1);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign_with(&key, &cert, &config).unwrap();
    list.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(algorithm::ECDSA_SHA1));
    assert_eq!(signed_der(&TrustList::load(&path).unwrap()), cert);
}

#[test]
fn comments_canonicalization_round_trips() {
    let (key, cert) = identity("Operator", 8);
    let config = SignatureConfig::default().with_c14n(tsledit_c14n::C14nMode::ExclusiveWithComments);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign_with(&key, &cert, &config).unwrap();
    assert_eq!(signed_der(&list), cert);
}

#[test]
fn failed_signing_leaves_the_list_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 9);
    let (_, other_cert) = identity("Someone Else", 99);

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();

    let mut reloaded = TrustList::load(&path).unwrap();
    let id = reloaded.id().map(str::to_owned);
    let err = reloaded.sign(&key, &other_cert).unwrap_err();
    assert!(matches!(err, Error::Key(_)));
    assert!(!reloaded.has_changed());
    assert_eq!(reloaded.id().map(str::to_owned), id);
    assert_eq!(signed_der(&reloaded), cert);
}

#[test]
fn unsigned_file_and_in_memory_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    assert_eq!(list.verify_integrity_only(), SignatureStatus::NotVerifiable);
    list.save(&path).unwrap();
    assert_eq!(list.verify_integrity_only(), SignatureStatus::Unsigned);

    let reloaded = TrustList::load(&path).unwrap();
    assert!(!reloaded.has_signature());
    assert_eq!(reloaded.verify_integrity_only(), SignatureStatus::Unsigned);
}

#[test]
fn model_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsl.xml");
    let (key, cert) = identity("Operator", 11);
    let (_, root_ca) = identity("Belgium Root CA", 12);

    let mut list = TrustList::new();
    CountryProfile::belgium()
        .apply(&mut list, OffsetDateTime::now_utc())
        .unwrap();
    list.set_sequence_number(4);
    let service = CountryProfile::belgium().providers[0].services[0]
        .build(&[root_ca])
        .unwrap();
    list.trust_service_provider_mut(0)
        .unwrap()
        .add_trust_service(service);
    let mut second = TrustServiceProvider::new("Another TSP");
    second.add_trust_service(TrustService::new(
        "Timestamping",
        tsledit_list::service::service_type::CA_QC,
        tsledit_list::service::status::ACCREDITED,
    ));
    list.add_trust_service_provider(second);
    list.sign(&key, &cert).unwrap();
    list.save(&path).unwrap();

    let reloaded = TrustList::load(&path).unwrap();
    assert_eq!(reloaded.scheme_names(), list.scheme_names());
    assert_eq!(reloaded.scheme_operator_names(), list.scheme_operator_names());
    assert_eq!(reloaded.sequence_number(), 4);
    assert_eq!(reloaded.trust_service_providers(), list.trust_service_providers());
    assert_eq!(reloaded.next_update(), list.next_update().map(truncate));
    assert_eq!(signed_der(&reloaded), cert);
}

/// Lists carry whole seconds.
fn truncate(t: OffsetDateTime) -> OffsetDateTime {
    t.replace_nanosecond(0).unwrap()
}

#[test]
fn locale_fallback_to_english() {
    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    for lang in ["en", "nl", "fr", "de", "EN"] {
        assert_eq!(list.scheme_name(lang), Some("BE:Test"));
    }
}

#[test]
fn fingerprints_of_the_signer() {
    let (key, cert) = identity("Operator", 13);
    let mut list = TrustList::new();
    list.sign(&key, &cert).unwrap();
    let signer = list.verify().unwrap();

    let sha1 = fingerprint(&signer, algorithm::SHA1).unwrap();
    let sha256 = fingerprint(&signer, algorithm::SHA256).unwrap();
    assert_eq!(sha1.len(), 40);
    assert_eq!(sha256.len(), 64);
    assert_eq!(sha256, x509::fingerprint(&cert, algorithm::SHA256).unwrap());
}

#[test]
fn parse_errors_are_not_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xml");
    std::fs::write(&path, "<tsl:TrustServiceStatusList").unwrap();
    let err = TrustList::load(&path).unwrap_err();
    assert!(err.is_parse_error());

    std::fs::write(&path, "<other/>").unwrap();
    assert!(matches!(TrustList::load(&path), Err(Error::XmlStructure(_))));
}

fn sign_with_fixture(name: &str, signature_method: &str) {
    let key_path = fixture(&format!("{name}.pem"));
    let cert_path = fixture(&format!("{name}.crt"));
    if !key_path.exists() || !cert_path.exists() {
        eprintln!("Skipping test: fixture not found at {}", key_path.display());
        return;
    }
    let key = tsledit_keys::loader::load_signing_identity(&key_path, &cert_path).unwrap();
    let cert = key.x509_chain[0].clone();

    let mut list = TrustList::new();
    list.set_scheme_name("en", "BE:Test");
    list.sign(&key, &cert).unwrap();
    assert!(list.to_xml().unwrap().contains(signature_method));
    assert_eq!(signed_der(&list), cert);
}

#[test]
fn rsa_fixture_signs_and_verifies() {
    sign_with_fixture("operator-rsa", algorithm::RSA_SHA256);
}

#[test]
fn ec_fixture_signs_and_verifies() {
    sign_with_fixture("operator-ec", algorithm::ECDSA_SHA256);
}

// ── Lists signed elsewhere ───────────────────────────────────────────

/// A list signed by another XML-DSig implementation: default namespace,
/// `URI=""` reference, comments outside the signature, no XAdES.
fn external_list() -> Option<(String, Vec<u8>)> {
    let path = tsl_fixture("external-rsa.xml");
    let cert_path = fixture("operator-rsa.crt");
    if !path.exists() || !cert_path.exists() {
        eprintln!("Skipping test: fixture not found at {}", path.display());
        return None;
    }
    let text = std::fs::read_to_string(&path).unwrap();
    let cert = tsledit_keys::loader::load_certificate_file(&cert_path).unwrap();
    Some((text, cert))
}

#[test]
fn external_signature_verifies() {
    let Some((text, cert)) = external_list() else {
        return;
    };
    let list = TrustList::from_xml(text.clone()).unwrap();
    assert!(list.has_signature());
    assert_eq!(list.id(), Some("tsl-external"));
    assert_eq!(signed_der(&list), cert);
    assert_eq!(list.signing_time(), None);

    let tampered = TrustList::from_xml(text.replace(">Citizen CA<", ">Forged CA<")).unwrap();
    assert!(matches!(
        tampered.verify_integrity_only(),
        SignatureStatus::Invalid { .. }
    ));
}

#[test]
fn external_list_model() {
    let Some((text, _)) = external_list() else {
        return;
    };
    let list = TrustList::from_xml(text).unwrap();
    assert_eq!(list.sequence_number(), 12);
    assert_eq!(
        list.scheme_operator_name("en"),
        Some("FPS Economy & Energy \"BE\" \r")
    );

    let pointer = &list.other_tsl_pointers()[0];
    assert_eq!(pointer.location, "https://ec.europa.eu/tools/lotl/eu-lotl.xml");
    assert_eq!(pointer.scheme_territory.as_deref(), Some("EU"));
    assert_eq!(
        pointer.service_digital_identities,
        [vec![DigitalIdentity::X509SubjectName("CN=EU Commission Signer".into())]]
    );

    let service = &list.trust_service_providers()[0].services[0];
    assert_eq!(service.service_supply_points, ["http://crl.eid.belgium.be/belgium.crl"]);
    assert!(service.qualifications_critical);
    assert_eq!(service.qualifications.len(), 1);
    assert_eq!(
        service.qualifications[0].qualifiers,
        [qualifier::QC_SSCD_STATUS_AS_IN_CERT, qualifier::QC_FOR_LEGAL_PERSON]
    );
    assert_eq!(service.other_extensions.len(), 1);
    assert!(!service.other_extensions[0].critical);
    assert_eq!(
        service.other_extensions[0].content,
        r#"<ext:TakenOverBy xmlns:ext="urn:example:ext">Example TSP</ext:TakenOverBy>"#
    );
}

#[test]
fn signing_a_loaded_list_keeps_what_the_model_does_not_cover() {
    let Some((text, external_cert)) = external_list() else {
        return;
    };
    let (key, cert) = identity("Operator", 30);
    let mut list = TrustList::from_xml(text).unwrap();
    list.sign(&key, &cert).unwrap();

    assert_eq!(list.id(), Some("tsl-external"));
    let signed = list.to_xml().unwrap();
    assert!(signed.contains("<!-- edited by hand -->"));
    assert!(signed.contains("<ServiceSupplyPoints>"));
    assert!(signed.contains("<ServiceDigitalIdentities>"));
    assert!(signed.contains("<ext:TakenOverBy>Example TSP</ext:TakenOverBy>"));
    assert_eq!(signed.matches("<ds:Signature ").count(), 1);
    assert_eq!(signed_der(&list), cert);
    assert_ne!(cert, external_cert);
    assert!(list.signing_time().is_some());
}

#[test]
fn remarshalling_a_loaded_list_keeps_what_it_read() {
    let Some((text, _)) = external_list() else {
        return;
    };
    let (key, cert) = identity("Operator", 31);
    let mut list = TrustList::from_xml(text).unwrap();
    list.set_sequence_number(13);
    list.sign(&key, &cert).unwrap();

    let reloaded = TrustList::from_xml(list.to_xml().unwrap()).unwrap();
    assert_eq!(reloaded.sequence_number(), 13);
    assert_eq!(reloaded.scheme_operator_names(), list.scheme_operator_names());
    assert_eq!(reloaded.other_tsl_pointers(), list.other_tsl_pointers());
    assert_eq!(reloaded.trust_service_providers(), list.trust_service_providers());
    assert_eq!(signed_der(&reloaded), cert);
}
