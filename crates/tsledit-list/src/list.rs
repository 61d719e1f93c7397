#![forbid(unsafe_code)]

//! The trust list document: scheme information, providers and the
//! load/save/sign/verify lifecycle.
//!
//! The typed fields are the only source of content. The serialized form
//! read by [`TrustList::load`] or produced by [`TrustList::sign`] is kept
//! next to them until the first mutation, so that the exact signed bytes can
//! be written out again and verified.

use crate::element::attr;
use crate::lang::LangStrings;
use crate::provider::{self, PostalAddress, TrustServiceProvider};
use crate::service::DigitalIdentity;
use crate::{marshal, unmarshal};
use std::path::Path;
use time::OffsetDateTime;
use tsledit_core::Error;
use tsledit_dsig::{DsigContext, SignatureConfig, VerifyResult};
use tsledit_keys::Key;
use x509_cert::Certificate;

/// Value of the root `TSLTag` attribute.
pub const TSL_TAG: &str = "http://uri.etsi.org/02231/TSLtag";

/// Default `TSLType`.
pub const TSL_TYPE_GENERIC: &str =
    "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/TSLtype/generic";

/// `TSLVersionIdentifier` written on every marshal.
pub const VERSION_IDENTIFIER: u32 = 3;

/// A pointer to another member state's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherTslPointer {
    /// One entry per `ServiceDigitalIdentity`: the identities that may sign
    /// the pointed-to list.
    pub service_digital_identities: Vec<Vec<DigitalIdentity>>,
    pub location: String,
    pub tsl_type: Option<String>,
    pub scheme_operator_name: LangStrings,
    pub scheme_types: Vec<String>,
    pub scheme_territory: Option<String>,
}

impl OtherTslPointer {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            service_digital_identities: Vec::new(),
            location: location.into(),
            tsl_type: None,
            scheme_operator_name: LangStrings::new(),
            scheme_types: Vec::new(),
            scheme_territory: None,
        }
    }
}

/// Outcome of checking the retained document's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// No serialized form to check: the list was created or changed in
    /// memory and not yet saved or signed.
    NotVerifiable,
    Unsigned,
    Invalid { reason: String },
    /// Signature and references verify; carries the signer certificate.
    Valid(Certificate),
}

impl SignatureStatus {
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            SignatureStatus::Valid(cert) => Some(cert),
            _ => None,
        }
    }
}

/// A Trust Service Status List.
#[derive(Debug, Clone)]
pub struct TrustList {
    pub(crate) scheme_name: LangStrings,
    pub(crate) scheme_operator_name: LangStrings,
    pub(crate) scheme_operator_postal_addresses: Vec<PostalAddress>,
    pub(crate) scheme_operator_electronic_addresses: Vec<String>,
    pub(crate) scheme_information_uris: LangStrings,
    pub(crate) status_determination_approach: Option<String>,
    pub(crate) scheme_types: Vec<String>,
    pub(crate) scheme_territory: Option<String>,
    pub(crate) legal_notices: LangStrings,
    pub(crate) historical_information_period: Option<u32>,
    pub(crate) tsl_type: String,
    pub(crate) sequence_number: u64,
    pub(crate) list_issue_date_time: Option<OffsetDateTime>,
    pub(crate) next_update: Option<OffsetDateTime>,
    pub(crate) distribution_points: Vec<String>,
    pub(crate) other_tsl_pointers: Vec<OtherTslPointer>,
    pub(crate) providers: Vec<TrustServiceProvider>,

    id: Option<String>,
    raw: Option<String>,
    changed: bool,
}

impl Default for TrustList {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustList {
    /// An empty list. A new list counts as changed.
    pub fn new() -> Self {
        Self {
            scheme_name: LangStrings::new(),
            scheme_operator_name: LangStrings::new(),
            scheme_operator_postal_addresses: Vec::new(),
            scheme_operator_electronic_addresses: Vec::new(),
            scheme_information_uris: LangStrings::new(),
            status_determination_approach: None,
            scheme_types: Vec::new(),
            scheme_territory: None,
            legal_notices: LangStrings::new(),
            historical_information_period: None,
            tsl_type: TSL_TYPE_GENERIC.to_owned(),
            sequence_number: 1,
            list_issue_date_time: None,
            next_update: None,
            distribution_points: Vec::new(),
            other_tsl_pointers: Vec::new(),
            providers: Vec::new(),
            id: None,
            raw: None,
            changed: true,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Read a list from a file, keeping its bytes for verification.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = non_empty(path.as_ref())?;
        log::debug!("loading trust list from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_xml(text)
    }

    /// Parse a serialized list, keeping the text for verification.
    pub fn from_xml(text: String) -> Result<Self, Error> {
        let mut list = unmarshal::unmarshal(&text)?;
        list.raw = Some(text);
        list.changed = false;
        Ok(list)
    }

    /// Write the list without an XML declaration.
    ///
    /// An unchanged loaded or freshly signed list is written byte for byte;
    /// otherwise the model is marshalled unsigned.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = non_empty(path.as_ref())?;
        let (id, xml) = match &self.raw {
            Some(raw) => (self.id.clone(), raw.clone()),
            None => {
                let (id, xml) = marshal::marshal(self)?;
                (Some(id), xml)
            }
        };
        std::fs::write(path, xml.as_bytes())?;
        log::debug!("saved trust list to {}", path.display());
        self.id = id;
        self.raw = Some(xml);
        self.changed = false;
        Ok(())
    }

    /// The document as it would be saved.
    pub fn to_xml(&self) -> Result<String, Error> {
        match &self.raw {
            Some(raw) => Ok(raw.clone()),
            None => marshal::marshal(self).map(|(_, xml)| xml),
        }
    }

    /// Sign with the default algorithms (SHA-256 references, exclusive
    /// c14n, SHA-1 certificate digest).
    pub fn sign(&mut self, key: &Key, certificate_der: &[u8]) -> Result<(), Error> {
        self.sign_with(key, certificate_der, &SignatureConfig::default())
    }

    /// Sign the list, replacing any previous signature.
    ///
    /// An unchanged loaded or signed list is signed as retained, under its
    /// root id, so content the model does not cover is kept. Otherwise the
    /// model is marshalled under a fresh root id. On error the list is left
    /// exactly as it was.
    pub fn sign_with(
        &mut self,
        key: &Key,
        certificate_der: &[u8],
        config: &SignatureConfig,
    ) -> Result<(), Error> {
        let (id, unsigned) = match &self.raw {
            Some(raw) => with_root_id(raw)?,
            None => marshal::marshal(self)?,
        };
        let ctx = DsigContext::new(key.clone(), certificate_der.to_vec()).with_config(config.clone());
        let signed = tsledit_dsig::sign_enveloped(&ctx, &unsigned)?;
        log::debug!("signed trust list {id}");
        self.id = Some(id);
        self.raw = Some(signed);
        self.changed = true;
        Ok(())
    }

    /// True when the retained document carries an enveloped signature.
    pub fn has_signature(&self) -> bool {
        let Some(raw) = &self.raw else {
            return false;
        };
        roxmltree::Document::parse_with_options(raw, tsledit_xml::parsing_options())
            .map(|doc| tsledit_dsig::verify::find_enveloped_signature(&doc).is_some())
            .unwrap_or(false)
    }

    /// Check the signature of the retained document.
    ///
    /// Only the signature itself and the XAdES certificate binding are
    /// checked; the signer certificate is not validated against any trust
    /// anchor.
    pub fn verify_integrity_only(&self) -> SignatureStatus {
        let Some(raw) = &self.raw else {
            log::debug!("no serialized trust list to verify");
            return SignatureStatus::NotVerifiable;
        };
        match tsledit_dsig::verify(raw) {
            Ok(VerifyResult::Unsigned) => SignatureStatus::Unsigned,
            Ok(VerifyResult::Valid { certificate }) => SignatureStatus::Valid(certificate),
            Ok(VerifyResult::Invalid { reason }) => SignatureStatus::Invalid { reason },
            Err(e) => {
                log::warn!("trust list signature cannot be processed: {e}");
                SignatureStatus::Invalid {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `SigningTime` claimed by the retained document's signature. Not
    /// checked against anything.
    pub fn signing_time(&self) -> Option<OffsetDateTime> {
        let raw = self.raw.as_ref()?;
        let doc = roxmltree::Document::parse_with_options(raw, tsledit_xml::parsing_options()).ok()?;
        let signature = tsledit_dsig::verify::find_enveloped_signature(&doc)?;
        tsledit_dsig::xades::signing_time(signature)
    }

    /// The signer certificate when the signature verifies.
    pub fn verify(&self) -> Option<Certificate> {
        match self.verify_integrity_only() {
            SignatureStatus::Valid(cert) => Some(cert),
            _ => None,
        }
    }

    /// True after any mutation or signing, until the next save.
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Root `Id` of the last loaded, saved or signed document.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn touch(&mut self) {
        self.raw = None;
        self.changed = true;
    }

    // ── Scheme information ───────────────────────────────────────────

    pub fn scheme_name(&self, lang: &str) -> Option<&str> {
        self.scheme_name.get(lang)
    }

    pub fn scheme_names(&self) -> &LangStrings {
        &self.scheme_name
    }

    pub fn set_scheme_name(&mut self, lang: &str, name: &str) {
        self.scheme_name.set(lang, name);
        self.touch();
    }

    pub fn scheme_operator_name(&self, lang: &str) -> Option<&str> {
        self.scheme_operator_name.get(lang)
    }

    pub fn scheme_operator_names(&self) -> &LangStrings {
        &self.scheme_operator_name
    }

    pub fn set_scheme_operator_name(&mut self, lang: &str, name: &str) {
        self.scheme_operator_name.set(lang, name);
        self.touch();
    }

    /// Exact language match only.
    pub fn scheme_operator_postal_address(&self, lang: &str) -> Option<&PostalAddress> {
        provider::address_for(&self.scheme_operator_postal_addresses, lang)
    }

    pub fn scheme_operator_postal_addresses(&self) -> &[PostalAddress] {
        &self.scheme_operator_postal_addresses
    }

    /// Adds or replaces the address in the address's language.
    pub fn set_scheme_operator_postal_address(&mut self, address: PostalAddress) {
        provider::set_address(&mut self.scheme_operator_postal_addresses, address);
        self.touch();
    }

    pub fn scheme_operator_electronic_addresses(&self) -> &[String] {
        &self.scheme_operator_electronic_addresses
    }

    pub fn set_scheme_operator_electronic_addresses<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scheme_operator_electronic_addresses = uris.into_iter().map(Into::into).collect();
        self.touch();
    }

    pub fn scheme_information_uris(&self) -> &LangStrings {
        &self.scheme_information_uris
    }

    pub fn add_scheme_information_uri(&mut self, lang: &str, uri: &str) {
        self.scheme_information_uris.add(lang, uri);
        self.touch();
    }

    pub fn status_determination_approach(&self) -> Option<&str> {
        self.status_determination_approach.as_deref()
    }

    pub fn set_status_determination_approach(&mut self, uri: &str) {
        self.status_determination_approach = Some(uri.to_owned());
        self.touch();
    }

    pub fn scheme_types(&self) -> &[String] {
        &self.scheme_types
    }

    pub fn add_scheme_type(&mut self, uri: &str) {
        self.scheme_types.push(uri.to_owned());
        self.touch();
    }

    pub fn scheme_territory(&self) -> Option<&str> {
        self.scheme_territory.as_deref()
    }

    pub fn set_scheme_territory(&mut self, territory: &str) {
        self.scheme_territory = Some(territory.to_owned());
        self.touch();
    }

    /// Exact language match only.
    pub fn legal_notice(&self, lang: &str) -> Option<&str> {
        self.legal_notices.find(lang)
    }

    pub fn legal_notices(&self) -> &LangStrings {
        &self.legal_notices
    }

    pub fn add_legal_notice(&mut self, lang: &str, notice: &str) {
        self.legal_notices.add(lang, notice);
        self.touch();
    }

    /// In days.
    pub fn historical_information_period(&self) -> Option<u32> {
        self.historical_information_period
    }

    pub fn set_historical_information_period(&mut self, days: u32) {
        self.historical_information_period = Some(days);
        self.touch();
    }

    pub fn tsl_tag(&self) -> &'static str {
        TSL_TAG
    }

    pub fn version_identifier(&self) -> u32 {
        VERSION_IDENTIFIER
    }

    pub fn tsl_type(&self) -> &str {
        &self.tsl_type
    }

    pub fn set_tsl_type(&mut self, uri: &str) {
        self.tsl_type = uri.to_owned();
        self.touch();
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn set_sequence_number(&mut self, sequence_number: u64) {
        self.sequence_number = sequence_number;
        self.touch();
    }

    pub fn list_issue_date_time(&self) -> Option<OffsetDateTime> {
        self.list_issue_date_time
    }

    pub fn set_list_issue_date_time(&mut self, t: OffsetDateTime) {
        self.list_issue_date_time = Some(t);
        self.touch();
    }

    pub fn next_update(&self) -> Option<OffsetDateTime> {
        self.next_update
    }

    pub fn set_next_update(&mut self, t: OffsetDateTime) {
        self.next_update = Some(t);
        self.touch();
    }

    pub fn distribution_points(&self) -> &[String] {
        &self.distribution_points
    }

    pub fn add_distribution_point(&mut self, uri: &str) {
        self.distribution_points.push(uri.to_owned());
        self.touch();
    }

    pub fn other_tsl_pointers(&self) -> &[OtherTslPointer] {
        &self.other_tsl_pointers
    }

    pub fn add_other_tsl_pointer(&mut self, pointer: OtherTslPointer) {
        self.other_tsl_pointers.push(pointer);
        self.touch();
    }

    // ── Providers ────────────────────────────────────────────────────

    pub fn trust_service_providers(&self) -> &[TrustServiceProvider] {
        &self.providers
    }

    pub fn add_trust_service_provider(&mut self, provider: TrustServiceProvider) {
        self.providers.push(provider);
        self.touch();
    }

    /// Mutable access to a provider. Counts as a mutation of the list.
    pub fn trust_service_provider_mut(&mut self, index: usize) -> Option<&mut TrustServiceProvider> {
        if index >= self.providers.len() {
            return None;
        }
        self.touch();
        self.providers.get_mut(index)
    }
}

/// Hex fingerprint of a certificate under the given digest URI.
pub fn fingerprint(certificate: &Certificate, digest_uri: &str) -> Result<String, Error> {
    let der = tsledit_keys::x509::to_der(certificate)?;
    tsledit_keys::x509::fingerprint(&der, digest_uri)
}

/// The retained document and its root `Id`, adding a fresh one when the
/// document element has none.
fn with_root_id(raw: &str) -> Result<(String, String), Error> {
    let doc = roxmltree::Document::parse_with_options(raw, tsledit_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let root = doc.root_element();
    if let Some(id) = root.attribute(attr::ID) {
        return Ok((id.to_owned(), raw.to_owned()));
    }
    let name_start = root.range().start + 1;
    let name_len = raw
        .get(name_start..)
        .and_then(|rest| rest.find(|c: char| c.is_whitespace() || c == '/' || c == '>'))
        .ok_or_else(|| Error::XmlStructure("unterminated document element".into()))?;
    let at = name_start + name_len;

    let id = marshal::fresh_id();
    log::debug!("document element has no Id, assigning {id}");
    let mut out = String::with_capacity(raw.len() + id.len() + 6);
    out.push_str(&raw[..at]);
    out.push_str(&format!(r#" {}="{id}""#, attr::ID));
    out.push_str(&raw[at..]);
    Ok((id, out))
}

fn non_empty(path: &Path) -> Result<&Path, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("empty trust list path".into()));
    }
    Ok(path)
}
