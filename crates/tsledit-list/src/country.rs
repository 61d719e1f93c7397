#![forbid(unsafe_code)]

//! EU member states as they appear in trust list territories.

/// An EU member state. Variant names are the trust list territory codes;
/// Greece and the United Kingdom differ from their ISO codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EuCountry {
    BE,
    BG,
    CZ,
    DK,
    DE,
    EE,
    IE,
    EL,
    ES,
    FR,
    IT,
    CY,
    LV,
    LT,
    LU,
    HU,
    MT,
    NL,
    AT,
    PL,
    PT,
    RO,
    SI,
    SK,
    FI,
    SE,
    UK,
}

struct CountryNames {
    iso_code: &'static str,
    short_src_lang_name: &'static str,
    short_english_name: &'static str,
    official_english_name: &'static str,
}

impl EuCountry {
    pub const ALL: [EuCountry; 27] = [
        Self::BE, Self::BG, Self::CZ, Self::DK, Self::DE, Self::EE, Self::IE, Self::EL, Self::ES,
        Self::FR, Self::IT, Self::CY, Self::LV, Self::LT, Self::LU, Self::HU, Self::MT, Self::NL,
        Self::AT, Self::PL, Self::PT, Self::RO, Self::SI, Self::SK, Self::FI, Self::SE, Self::UK,
    ];

    fn names(self) -> CountryNames {
        let (iso_code, short_src_lang_name, short_english_name, official_english_name) = match self {
            Self::BE => ("BE", "Belgique/België", "Belgium", "Kingdom of Belgium"),
            Self::BG => ("BG", "България (*)", "Bulgaria", "Republic of Bulgaria"),
            Self::CZ => ("CZ", "Česká republika", "Czech Republic", "Czech Republic"),
            Self::DK => ("DK", "Danmark", "Denmark", "Kingdom of Denmark"),
            Self::DE => ("DE", "Deutschland", "Germany", "Federal Republic of Germany"),
            Self::EE => ("EE", "Eesti", "Estonia", "Republic of Estonia"),
            Self::IE => ("IE", "Éire/Ireland", "Ireland", "Ireland"),
            Self::EL => ("GR", "Ελλάδα (*)", "Greece", "Hellenic Republic"),
            Self::ES => ("ES", "España", "Spain", "Kingdom of Spain"),
            Self::FR => ("FR", "France", "France", "French Republic"),
            Self::IT => ("IT", "Italia", "Italy", "Italian Republic"),
            Self::CY => ("CY", "Κύπρος/Kıbrıs (*)", "Cyprus", "Republic of Cyprus"),
            Self::LV => ("LV", "Latvija", "Latvia", "Republic of Latvia"),
            Self::LT => ("LT", "Lietuva", "Lithuania", "Republic of Lithuania"),
            Self::LU => ("LU", "Luxembourg", "Luxembourg", "Grand Duchy of Luxembourg"),
            Self::HU => ("HU", "Magyarország", "Hungary", "Republic of Hungary"),
            Self::MT => ("MT", "Malta", "Malta", "Republic of Malta"),
            Self::NL => ("NL", "Nederland", "Netherlands", "Kingdom of the Netherlands"),
            Self::AT => ("AT", "Österreich", "Austria", "Republic of Austria"),
            Self::PL => ("PL", "Polska", "Poland", "Republic of Poland"),
            Self::PT => ("PT", "Portugal", "Portugal", "Portuguese Republic"),
            Self::RO => ("RO", "România", "Romania", "Romania"),
            Self::SI => ("SI", "Slovenija", "Slovenia", "Republic of Slovenia"),
            Self::SK => ("SK", "Slovensko", "Slovakia", "Slovak Republic"),
            Self::FI => ("FI", "Suomi/Finland", "Finland", "Republic of Finland"),
            Self::SE => ("SE", "Sverige", "Sweden", "Kingdom of Sweden"),
            Self::UK => (
                "GB",
                "United Kingdom",
                "United Kingdom",
                "United Kingdom of Great Britain and Northern Ireland",
            ),
        };
        CountryNames {
            iso_code,
            short_src_lang_name,
            short_english_name,
            official_english_name,
        }
    }

    /// The code used as `SchemeTerritory` (`EL`, `UK` rather than ISO).
    pub fn territory_code(self) -> &'static str {
        match self {
            Self::EL => "EL",
            Self::UK => "UK",
            other => other.names().iso_code,
        }
    }

    /// ISO 3166-1 alpha-2 code.
    pub fn iso_code(self) -> &'static str {
        self.names().iso_code
    }

    /// Short name in the country's own language(s).
    pub fn short_src_lang_name(self) -> &'static str {
        self.names().short_src_lang_name
    }

    pub fn short_english_name(self) -> &'static str {
        self.names().short_english_name
    }

    pub fn official_english_name(self) -> &'static str {
        self.names().official_english_name
    }

    /// Look up by territory code or ISO code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            c.territory_code().eq_ignore_ascii_case(code) || c.iso_code().eq_ignore_ascii_case(code)
        })
    }
}

impl std::fmt::Display for EuCountry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_english_name())
    }
}
