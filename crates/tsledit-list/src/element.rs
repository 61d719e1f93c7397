#![forbid(unsafe_code)]

//! Element and attribute names of the TSL schema and its `ecc` extension.

// tsl
pub const TRUST_SERVICE_STATUS_LIST: &str = "TrustServiceStatusList";
pub const SCHEME_INFORMATION: &str = "SchemeInformation";
pub const TSL_VERSION_IDENTIFIER: &str = "TSLVersionIdentifier";
pub const TSL_SEQUENCE_NUMBER: &str = "TSLSequenceNumber";
pub const TSL_TYPE: &str = "TSLType";
pub const SCHEME_OPERATOR_NAME: &str = "SchemeOperatorName";
pub const NAME: &str = "Name";
pub const SCHEME_OPERATOR_ADDRESS: &str = "SchemeOperatorAddress";
pub const POSTAL_ADDRESSES: &str = "PostalAddresses";
pub const POSTAL_ADDRESS: &str = "PostalAddress";
pub const STREET_ADDRESS: &str = "StreetAddress";
pub const LOCALITY: &str = "Locality";
pub const STATE_OR_PROVINCE: &str = "StateOrProvince";
pub const POSTAL_CODE: &str = "PostalCode";
pub const COUNTRY_NAME: &str = "CountryName";
pub const ELECTRONIC_ADDRESS: &str = "ElectronicAddress";
pub const URI: &str = "URI";
pub const SCHEME_NAME: &str = "SchemeName";
pub const SCHEME_INFORMATION_URI: &str = "SchemeInformationURI";
pub const STATUS_DETERMINATION_APPROACH: &str = "StatusDeterminationApproach";
pub const SCHEME_TYPE_COMMUNITY_RULES: &str = "SchemeTypeCommunityRules";
pub const SCHEME_TERRITORY: &str = "SchemeTerritory";
pub const POLICY_OR_LEGAL_NOTICE: &str = "PolicyOrLegalNotice";
pub const TSL_LEGAL_NOTICE: &str = "TSLLegalNotice";
pub const HISTORICAL_INFORMATION_PERIOD: &str = "HistoricalInformationPeriod";
pub const POINTERS_TO_OTHER_TSL: &str = "PointersToOtherTSL";
pub const OTHER_TSL_POINTER: &str = "OtherTSLPointer";
pub const SERVICE_DIGITAL_IDENTITIES: &str = "ServiceDigitalIdentities";
pub const TSL_LOCATION: &str = "TSLLocation";
pub const ADDITIONAL_INFORMATION: &str = "AdditionalInformation";
pub const OTHER_INFORMATION: &str = "OtherInformation";
pub const LIST_ISSUE_DATE_TIME: &str = "ListIssueDateTime";
pub const NEXT_UPDATE: &str = "NextUpdate";
pub const DATE_TIME: &str = "dateTime";
pub const DISTRIBUTION_POINTS: &str = "DistributionPoints";
pub const TRUST_SERVICE_PROVIDER_LIST: &str = "TrustServiceProviderList";
pub const TRUST_SERVICE_PROVIDER: &str = "TrustServiceProvider";
pub const TSP_INFORMATION: &str = "TSPInformation";
pub const TSP_NAME: &str = "TSPName";
pub const TSP_TRADE_NAME: &str = "TSPTradeName";
pub const TSP_ADDRESS: &str = "TSPAddress";
pub const TSP_INFORMATION_URI: &str = "TSPInformationURI";
pub const TSP_SERVICES: &str = "TSPServices";
pub const TSP_SERVICE: &str = "TSPService";
pub const SERVICE_INFORMATION: &str = "ServiceInformation";
pub const SERVICE_TYPE_IDENTIFIER: &str = "ServiceTypeIdentifier";
pub const SERVICE_NAME: &str = "ServiceName";
pub const SERVICE_DIGITAL_IDENTITY: &str = "ServiceDigitalIdentity";
pub const DIGITAL_ID: &str = "DigitalId";
pub const X509_CERTIFICATE: &str = "X509Certificate";
pub const X509_SUBJECT_NAME: &str = "X509SubjectName";
pub const X509_SKI: &str = "X509SKI";
pub const SERVICE_STATUS: &str = "ServiceStatus";
pub const STATUS_STARTING_TIME: &str = "StatusStartingTime";
pub const SERVICE_SUPPLY_POINTS: &str = "ServiceSupplyPoints";
pub const SERVICE_SUPPLY_POINT: &str = "ServiceSupplyPoint";
pub const SERVICE_INFORMATION_EXTENSIONS: &str = "ServiceInformationExtensions";
pub const EXTENSION: &str = "Extension";
pub const SERVICE_HISTORY: &str = "ServiceHistory";
pub const SERVICE_HISTORY_INSTANCE: &str = "ServiceHistoryInstance";

// ecc
pub const QUALIFICATIONS: &str = "Qualifications";
pub const QUALIFICATION_ELEMENT: &str = "QualificationElement";
pub const QUALIFIERS: &str = "Qualifiers";
pub const QUALIFIER: &str = "Qualifier";
pub const CRITERIA_LIST: &str = "CriteriaList";
pub const POLICY_SET: &str = "PolicySet";
pub const POLICY_IDENTIFIER: &str = "PolicyIdentifier";

// xades
pub const IDENTIFIER: &str = "Identifier";
pub const DESCRIPTION: &str = "Description";

pub mod attr {
    pub const ID: &str = "Id";
    pub const TSL_TAG: &str = "TSLTag";
    pub const LANG: &str = "lang";
    pub const CRITICAL: &str = "Critical";
    pub const QUALIFIER_URI: &str = "uri";
    pub const ASSERT: &str = "assert";
}
