#![forbid(unsafe_code)]

//! Trust services: the certificates a provider operates, their status and
//! qualifications.

use crate::lang::LangStrings;
use time::OffsetDateTime;
use tsledit_core::Error;
use tsledit_keys::x509;

/// Service type identifiers.
pub mod service_type {
    pub const CA_QC: &str = "http://uri.etsi.org/TrstSvc/Svctype/CA/QC";
    pub const NATIONAL_ROOT_CA_QC: &str = "http://uri.etsi.org/TrstSvc/Svctype/NationalRootCA-QC";
}

/// Service status URIs.
pub mod status {
    const BASE: &str = "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/";

    pub const UNDER_SUPERVISION: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/undersupervision";
    pub const SUPERVISION_INCESSATION: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/supervisionincessation";
    pub const SUPERVISION_CEASED: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/supervisionceased";
    pub const SUPERVISION_REVOKED: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/supervisionrevoked";
    pub const ACCREDITED: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/accredited";
    pub const ACCREDITATION_CEASED: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/accreditationceased";
    pub const ACCREDITATION_REVOKED: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/accreditationrevoked";
    pub const SET_BY_NATIONAL_LAW: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/setbynationallaw";
    pub const DEPRECATED_BY_NATIONAL_LAW: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/Svcstatus/deprecatedbynationallaw";

    /// The last path segment of a status URI, for display.
    pub fn short_name(uri: &str) -> &str {
        uri.strip_prefix(BASE).unwrap_or(uri)
    }
}

/// Qualifier URIs used in `ecc:Qualifications`.
pub mod qualifier {
    pub const QC_NO_SSCD: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCNoSSCD";
    pub const QC_SSCD_STATUS_AS_IN_CERT: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCSSCDStatusAsInCert";
    pub const QC_FOR_LEGAL_PERSON: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCForLegalPerson";
    pub const QC_WITH_SSCD: &str =
        "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCWithSSCD";
}

/// One `DigitalId` of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigitalIdentity {
    /// DER certificate.
    X509Certificate(Vec<u8>),
    X509SubjectName(String),
    /// Subject key identifier bytes.
    X509Ski(Vec<u8>),
}

/// An `xades:Identifier` OID with its optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyIdentifier {
    pub oid: String,
    pub description: Option<String>,
}

/// An `ecc:QualificationElement`: qualifiers applied to certificates
/// matching the policy sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualification {
    pub qualifiers: Vec<String>,
    /// `assert` attribute of the criteria list.
    pub criteria_assert: String,
    pub policy_sets: Vec<Vec<PolicyIdentifier>>,
}

impl Qualification {
    pub fn new(qualifier: impl Into<String>) -> Self {
        Self {
            qualifiers: vec![qualifier.into()],
            criteria_assert: "atLeastOne".to_owned(),
            policy_sets: Vec::new(),
        }
    }

    /// All OIDs across the policy sets, in order.
    pub fn oids(&self) -> impl Iterator<Item = &str> {
        self.policy_sets
            .iter()
            .flatten()
            .map(|p| p.oid.as_str())
    }
}

/// A service information extension this editor does not model, kept as
/// self-contained canonical XML of its child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherExtension {
    pub critical: bool,
    pub content: String,
}

/// A previous status of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHistoryInstance {
    pub service_type: String,
    pub name: LangStrings,
    pub digital_identities: Vec<DigitalIdentity>,
    pub status: String,
    pub status_starting_time: Option<OffsetDateTime>,
}

impl ServiceHistoryInstance {
    /// A history entry for the given certificates. The name defaults to the
    /// first certificate's subject and the start to its notBefore.
    pub fn from_certificates(
        service_type: &str,
        name: Option<&str>,
        status: &str,
        status_starting_time: Option<OffsetDateTime>,
        certificates: &[Vec<u8>],
    ) -> Result<Self, Error> {
        let identity = CertificateIdentity::from_certificates(certificates)?;
        let mut names = LangStrings::new();
        names.set("en", name.unwrap_or(&identity.subject));
        Ok(Self {
            service_type: service_type.to_owned(),
            name: names,
            digital_identities: identity.digital_identities,
            status: status.to_owned(),
            status_starting_time: Some(status_starting_time.unwrap_or(identity.not_before)),
        })
    }
}

/// A `TSPService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustService {
    pub service_type: String,
    pub name: LangStrings,
    pub digital_identities: Vec<DigitalIdentity>,
    pub status: String,
    pub status_starting_time: Option<OffsetDateTime>,
    /// `ServiceSupplyPoint` URIs.
    pub service_supply_points: Vec<String>,
    /// `ecc:Qualifications` of the qualifications extension.
    pub qualifications: Vec<Qualification>,
    /// `Critical` flag of the qualifications extension.
    pub qualifications_critical: bool,
    pub other_extensions: Vec<OtherExtension>,
    pub history: Vec<ServiceHistoryInstance>,
}

impl TrustService {
    /// An empty service of the given type and status.
    pub fn new(name: &str, service_type: &str, status: &str) -> Self {
        let mut names = LangStrings::new();
        names.set("en", name);
        Self {
            service_type: service_type.to_owned(),
            name: names,
            digital_identities: Vec::new(),
            status: status.to_owned(),
            status_starting_time: None,
            service_supply_points: Vec::new(),
            qualifications: Vec::new(),
            qualifications_critical: true,
            other_extensions: Vec::new(),
            history: Vec::new(),
        }
    }

    /// A `CA/QC` service under supervision, identified by `certificates`.
    ///
    /// Every certificate becomes an `X509Certificate` identity; the first
    /// also contributes its subject name and subject key identifier. The
    /// service is named after the first subject and its status starts at
    /// the first certificate's notBefore.
    pub fn from_certificates(certificates: &[Vec<u8>]) -> Result<Self, Error> {
        let identity = CertificateIdentity::from_certificates(certificates)?;
        let mut service = Self::new(
            &identity.subject,
            service_type::CA_QC,
            status::UNDER_SUPERVISION,
        );
        service.digital_identities = identity.digital_identities;
        service.status_starting_time = Some(identity.not_before);
        Ok(service)
    }

    /// Name for `lang`, with the usual English fallback.
    pub fn name(&self, lang: &str) -> Option<&str> {
        self.name.get(lang)
    }

    /// DER certificates among the digital identities.
    pub fn certificates(&self) -> impl Iterator<Item = &[u8]> {
        self.digital_identities.iter().filter_map(|id| match id {
            DigitalIdentity::X509Certificate(der) => Some(der.as_slice()),
            _ => None,
        })
    }

    /// Add a policy OID under `qualifier_uri`.
    ///
    /// When a qualification element with exactly this qualifier exists the
    /// OID is appended to it as a new policy set; otherwise a new element is
    /// created.
    pub fn add_qualification(&mut self, qualifier_uri: &str, oid: &str, description: Option<&str>) {
        let policy = PolicyIdentifier {
            oid: oid.to_owned(),
            description: description.map(str::to_owned),
        };
        match self
            .qualifications
            .iter_mut()
            .find(|q| q.qualifiers == [qualifier_uri])
        {
            Some(existing) => existing.policy_sets.push(vec![policy]),
            None => {
                let mut qualification = Qualification::new(qualifier_uri);
                qualification.policy_sets.push(vec![policy]);
                self.qualifications.push(qualification);
            }
        }
    }

    pub fn add_history(&mut self, instance: ServiceHistoryInstance) {
        self.history.push(instance);
    }
}

/// Identity facts shared by services and history entries.
struct CertificateIdentity {
    subject: String,
    not_before: OffsetDateTime,
    digital_identities: Vec<DigitalIdentity>,
}

impl CertificateIdentity {
    fn from_certificates(certificates: &[Vec<u8>]) -> Result<Self, Error> {
        let first_der = certificates
            .first()
            .ok_or_else(|| Error::InvalidInput("a trust service needs at least one certificate".into()))?;
        let first = x509::parse_der(first_der)?;

        let mut digital_identities = Vec::with_capacity(certificates.len() + 2);
        for der in certificates {
            x509::parse_der(der)?;
            digital_identities.push(DigitalIdentity::X509Certificate(der.clone()));
        }
        let subject = x509::subject_name(&first);
        digital_identities.push(DigitalIdentity::X509SubjectName(subject.clone()));
        digital_identities.push(DigitalIdentity::X509Ski(x509::subject_key_identifier(&first)?));

        Ok(Self {
            subject,
            not_before: x509::not_before(&first)?,
            digital_identities,
        })
    }
}
