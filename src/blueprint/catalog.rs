use std::collections::HashMap;
use std::sync::OnceLock;

use crate::model::{Blueprint, Conditional, FieldSpec, FieldType, SectionSpec, SpecialHandling};

use FieldType::*;

struct FieldDef {
    key: &'static str,
    label: &'static str,
    ty: FieldType,
    when: Option<(&'static str, &'static str)>,
}

struct SectionDef {
    title: &'static str,
    fields: &'static [FieldDef],
}

struct FormDef {
    name: &'static str,
    title: &'static str,
    sections: &'static [SectionDef],
}

const fn f(key: &'static str, label: &'static str, ty: FieldType) -> FieldDef {
    FieldDef { key, label, ty, when: None }
}

const fn when(
    key: &'static str,
    label: &'static str,
    ty: FieldType,
    depends_on: &'static str,
    value: &'static str,
) -> FieldDef {
    FieldDef { key, label, ty, when: Some((depends_on, value)) }
}

const POLICY_DETAILS: SectionDef = SectionDef {
    title: "Policy Details",
    fields: &[
        f("policyNumber", "Policy Number", Text),
        f("periodOfCoverFrom", "Period of Cover From", Date),
        f("periodOfCoverTo", "Period of Cover To", Date),
    ],
};

const SYSTEM_INFORMATION: SectionDef = SectionDef {
    title: "System Information",
    fields: &[
        f("status", "Status", Text),
        f("submittedAt", "Submitted At", Date),
        f("createdAt", "Created At", Date),
        f("formType", "Form Type", Text),
    ],
};

const FORMS: &[FormDef] = &[
    FormDef {
        name: "money-insurance-claims",
        title: "Money Insurance Claim Form",
        sections: &[
            POLICY_DETAILS,
            SectionDef {
                title: "Company Information",
                fields: &[
                    f("companyName", "Company Name", Text),
                    f("address", "Address", Textarea),
                    f("phone", "Phone Number", Text),
                    f("email", "Email Address", Email),
                ],
            },
            SectionDef {
                title: "Details of Loss",
                fields: &[
                    f("lossDate", "Date of Loss", Date),
                    f("lossTime", "Time of Loss", Text),
                    f("lossLocation", "Location of Loss", Textarea),
                    f("moneyLocation", "Money Location", Text),
                    f("lossAmount", "Amount of Loss", Currency),
                    f("lossDescription", "Description of Loss", Textarea),
                    f("howItHappened", "How it Happened", Textarea),
                ],
            },
            SectionDef {
                title: "Loss in Transit Details",
                fields: &[
                    f("discovererName", "Person who Discovered Loss", Text),
                    f("discovererPosition", "Position", Text),
                    f("discovererSalary", "Salary", Currency),
                    f("policeEscort", "Police Escort", Text),
                    f("amountAtStart", "Amount at Journey Start", Currency),
                    f("disbursements", "Disbursements Made", Currency),
                    f("doubtIntegrity", "Doubt Employee Integrity", Text),
                    when("integrityExplanation", "Integrity Explanation", Textarea, "doubtIntegrity", "yes"),
                ],
            },
            SectionDef {
                title: "Loss in Safe Details",
                fields: &[
                    f("safeType", "Safe Type", Text),
                    f("amountInSafe", "Amount in Safe", Currency),
                    f("keyholders", "Key Holders", Array),
                ],
            },
            SectionDef {
                title: "Additional Information",
                fields: &[
                    f("policeNotified", "Police Notified", Text),
                    when("policeStation", "Police Station", Text, "policeNotified", "yes"),
                    f("previousLoss", "Previous Loss", Text),
                    when("previousLossDetails", "Previous Loss Details", Textarea, "previousLoss", "yes"),
                ],
            },
            SYSTEM_INFORMATION,
        ],
    },
    FormDef {
        name: "rent-assurance-claims",
        title: "Rent Assurance Claim Form",
        sections: &[
            POLICY_DETAILS,
            SectionDef {
                title: "Insured Details (Tenant)",
                fields: &[
                    f("nameOfInsured", "Name of Insured (Tenant)", Text),
                    f("address", "Address", Textarea),
                    f("age", "Age", Number),
                    f("email", "Email Address", Email),
                    f("phone", "Phone Number", Text),
                    f("livingAtPremisesFrom", "Living at Premises From", Date),
                    f("livingAtPremisesTo", "Living at Premises To", Date),
                ],
            },
            SectionDef {
                title: "Landlord Details",
                fields: &[
                    f("nameOfLandlord", "Name of Landlord", Text),
                    f("addressOfLandlord", "Address of Landlord", Textarea),
                    f("nameOfBeneficiary", "Name of Beneficiary (Landlord)", Text),
                    f("beneficiaryAge", "Beneficiary Age", Number),
                    f("beneficiaryOccupation", "Beneficiary Occupation", Text),
                    f("beneficiaryAddress", "Beneficiary Address", Textarea),
                    f("beneficiaryEmail", "Beneficiary Email", Email),
                    f("beneficiaryPhone", "Beneficiary Phone", Text),
                ],
            },
            SectionDef {
                title: "Claim Information",
                fields: &[
                    f("periodOfDefaultFrom", "Period of Default From", Date),
                    f("periodOfDefaultTo", "Period of Default To", Date),
                    f("amountDefaulted", "Amount Defaulted", Currency),
                    f("rentDueDate", "Rent Due Date", Date),
                    f("rentPaymentFrequency", "Rent Payment Frequency", Text),
                    when("rentPaymentFrequencyOther", "Other Frequency Details", Text, "rentPaymentFrequency", "other"),
                    f("causeOfInabilityToPay", "Cause of Inability to Pay", Textarea),
                ],
            },
            SectionDef {
                title: "File Uploads",
                fields: &[
                    f("rentAgreement", "Rent Agreement", File),
                    f("demandNote", "Demand Note", File),
                    f("quitNotice", "Quit Notice", File),
                ],
            },
            SYSTEM_INFORMATION,
        ],
    },
    FormDef {
        name: "motor-claims",
        title: "Motor Claim",
        sections: &[
            POLICY_DETAILS,
            SectionDef {
                title: "Insured Details",
                fields: &[
                    f("nameCompany", "Name / Company Name", Text),
                    f("title", "Title", Text),
                    f("dateOfBirth", "Date of Birth", Date),
                    f("gender", "Gender", Text),
                    f("address", "Address", Textarea),
                    f("phone", "Phone Number", Text),
                    f("email", "Email", Email),
                ],
            },
            SectionDef {
                title: "Vehicle Details",
                fields: &[
                    f("registrationNumber", "Registration Number", Text),
                    f("make", "Make", Text),
                    f("model", "Model", Text),
                    f("year", "Year", Text),
                    f("engineNumber", "Engine Number", Text),
                    f("chassisNumber", "Chassis Number", Text),
                    f("registeredInYourName", "Registered in Your Name", Boolean),
                    when("registeredInYourNameDetails", "Registration Details", Text, "registeredInYourName", "false"),
                    f("ownedSolely", "Owned Solely by You", Boolean),
                    when("ownedSolelyDetails", "Ownership Details", Text, "ownedSolely", "false"),
                    f("hirePurchase", "Subject to Hire Purchase", Boolean),
                    when("hirePurchaseDetails", "Hire Purchase Details", Text, "hirePurchase", "true"),
                    f("vehicleUsage", "Vehicle Usage", Text),
                    f("trailerAttached", "Trailer Attached", Boolean),
                ],
            },
            SectionDef {
                title: "Incident Details",
                fields: &[
                    f("incidentLocation", "Incident Location", Text),
                    f("incidentDate", "Incident Date", Date),
                    f("incidentTime", "Incident Time", Text),
                    f("policeReported", "Police Reported", Boolean),
                    when("policeStationDetails", "Police Station Details", Text, "policeReported", "true"),
                    f("incidentDescription", "Incident Description", Textarea),
                    f("damageDescription", "Damage Description", Textarea),
                    f("inspectionLocation", "Inspection Location", Text),
                ],
            },
            SectionDef {
                title: "Witnesses",
                fields: &[f("witnesses", "Witnesses", Array)],
            },
            SectionDef {
                title: "Other Vehicle Details",
                fields: &[
                    f("otherVehicleInvolved", "Other Vehicle Involved", Boolean),
                    when("otherVehicleRegNumber", "Other Vehicle Registration", Text, "otherVehicleInvolved", "true"),
                    when("otherVehicleMakeModel", "Other Vehicle Make/Model", Text, "otherVehicleInvolved", "true"),
                    when("otherDriverName", "Other Driver Name", Text, "otherVehicleInvolved", "true"),
                    when("otherDriverPhone", "Other Driver Phone", Text, "otherVehicleInvolved", "true"),
                ],
            },
            SectionDef {
                title: "Declaration & Signature",
                fields: &[
                    f("agreeToDataPrivacy", "Agree to Data Privacy", Boolean),
                    f("declarationTrue", "Declaration True", Boolean),
                    f("signature", "Signature", Text),
                ],
            },
            SYSTEM_INFORMATION,
        ],
    },
    FormDef {
        name: "burglary-claims",
        title: "Burglary Insurance Claim",
        sections: &[
            POLICY_DETAILS,
            SectionDef {
                title: "Insured Details",
                fields: &[
                    f("nameOfInsured", "Name of Insured", Text),
                    f("companyName", "Company Name", Text),
                    f("address", "Address", Textarea),
                    f("phone", "Phone Number", Text),
                    f("email", "Email Address", Email),
                ],
            },
            SectionDef {
                title: "Details of Loss",
                fields: &[
                    f("premisesAddress", "Premises Address", Textarea),
                    f("dateOfTheft", "Date of Theft", Date),
                    f("timeOfTheft", "Time of Theft", Text),
                    f("howEntryEffected", "Give full details of how entry was effected", Textarea),
                    f("premisesOccupied", "Premises Occupied", Boolean),
                    f("suspicions", "Have Suspicions", Boolean),
                    when("suspicionName", "Suspicion Name", Text, "suspicions", "true"),
                    f("policeInformed", "Police Informed", Boolean),
                    when("policeStation", "Police Station", Text, "policeInformed", "true"),
                    f("totalContentsValue", "Total Contents Value", Currency),
                    f("previousLoss", "Previous Loss", Boolean),
                    when("previousLossDetails", "Previous Loss Details", Textarea, "previousLoss", "true"),
                ],
            },
            SectionDef {
                title: "Property Items",
                fields: &[f("propertyItems", "Property Items", Array)],
            },
            SectionDef {
                title: "Declaration & Signature",
                fields: &[
                    f("agreeToDataPrivacy", "Agree to Data Privacy", Boolean),
                    f("signature", "Digital Signature", Text),
                    f("signatureDate", "Signature Date", Date),
                ],
            },
            SYSTEM_INFORMATION,
        ],
    },
    FormDef {
        name: "employers-liability-claims",
        title: "Employers Liability Claim",
        sections: &[
            POLICY_DETAILS,
            SectionDef {
                title: "Insured Details",
                fields: &[
                    f("name", "Name", Text),
                    f("address", "Address", Text),
                    f("phone", "Phone", Text),
                    f("email", "Email", Email),
                ],
            },
            SectionDef {
                title: "Injured Party Details",
                fields: &[
                    f("injuredPartyName", "Injured Party Name", Text),
                    f("injuredPartyAge", "Injured Party Age", Number),
                    f("injuredPartyAddress", "Injured Party Address", Text),
                    f("averageMonthlyEarnings", "Average Monthly Earnings", Currency),
                    f("occupation", "Occupation", Text),
                    f("dateOfEmployment", "Date of Employment", Date),
                    f("previousAccidents", "Previous Accidents", Text),
                    when("previousAccidentsDetails", "Previous Accidents Details", Textarea, "previousAccidents", "yes"),
                ],
            },
            SectionDef {
                title: "Accident Details",
                fields: &[
                    f("accidentDate", "Accident Date", Date),
                    f("accidentTime", "Accident Time", Text),
                    f("accidentPlace", "Accident Place", Text),
                    f("howAccidentOccurred", "How Accident Occurred", Textarea),
                    f("natureOfInjuries", "Nature of Injuries", Textarea),
                ],
            },
            SectionDef {
                title: "Witnesses",
                fields: &[f("witnesses", "Witnesses", Array)],
            },
            SectionDef {
                title: "Statement of Earnings",
                fields: &[f("earnings", "Earnings Statement", Array)],
            },
            SectionDef {
                title: "Declaration & Signature",
                fields: &[
                    f("agreeToDataPrivacy", "Agree to Data Privacy", Boolean),
                    f("declarationTrue", "Declaration True", Boolean),
                    f("signature", "Signature", Text),
                ],
            },
            SYSTEM_INFORMATION,
        ],
    },
    FormDef {
        name: "corporate-kyc",
        title: "Corporate KYC Form",
        sections: CORPORATE_SECTIONS,
    },
    FormDef {
        name: "naicom-corporate-kyc",
        title: "NAICOM Corporate CDD",
        sections: CORPORATE_SECTIONS,
    },
];

const CORPORATE_SECTIONS: &[SectionDef] = &[
    SectionDef {
        title: "Company Details",
        fields: &[
            f("companyName", "Company Name", Text),
            f("registeredAddress", "Registered Company Address", Textarea),
            f("incorporationNumber", "Incorporation Number", Text),
            f("incorporationState", "Incorporation State", Text),
            f("dateOfIncorporation", "Date of Incorporation/Registration", Date),
            f("natureOfBusiness", "Nature of Business", Textarea),
            f("companyType", "Company Type", Text),
            when("companyTypeOther", "Please specify", Text, "companyType", "Other"),
            f("email", "Email Address", Email),
            f("website", "Website", Url),
            f("taxId", "Tax Identification Number", Text),
            f("telephone", "Telephone Number", Text),
        ],
    },
    SectionDef {
        title: "Director Info",
        fields: &[f("directors", "Directors", Array)],
    },
    SectionDef {
        title: "Account Details",
        fields: &[
            f("bankName", "Bank Name", Text),
            f("accountNumber", "Account Number", Text),
            f("bankBranch", "Bank Branch", Text),
            f("accountOpeningDate", "Account Opening Date", Date),
        ],
    },
    SectionDef {
        title: "Uploads",
        fields: &[
            f("cacCertificate", "CAC Certificate", File),
            f("identification", "Identification Document", File),
        ],
    },
    SectionDef {
        title: "Data Privacy & Declaration",
        fields: &[
            f(
                "agreeToDataPrivacy",
                "I agree to the data privacy terms and declaration and confirm that all information provided is true and accurate",
                Boolean,
            ),
            f("signature", "Digital Signature", Text),
        ],
    },
    SYSTEM_INFORMATION,
];

fn special_handling_for(name: &str) -> SpecialHandling {
    SpecialHandling {
        rent_assurance_note: name == "rent-assurance-claims",
        director_handling: name.contains("corporate") || name.contains("cdd") || name.contains("kyc"),
    }
}

fn build(form: &FormDef) -> Blueprint {
    let sections = form
        .sections
        .iter()
        .map(|section| SectionSpec {
            title: section.title.to_string(),
            fields: section
                .fields
                .iter()
                .map(|def| FieldSpec {
                    key: def.key.to_string(),
                    label: def.label.to_string(),
                    field_type: def.ty,
                    section_title: section.title.to_string(),
                    conditional: def.when.map(|(depends_on, value)| Conditional {
                        depends_on: depends_on.to_string(),
                        required_value: value.to_string(),
                    }),
                })
                .collect(),
        })
        .collect();
    Blueprint {
        title: form.title.to_string(),
        sections,
        special_handling: special_handling_for(form.name),
    }
}

static CATALOG: OnceLock<HashMap<&'static str, Blueprint>> = OnceLock::new();

/// The authored blueprint table, keyed by normalized form-type name.
/// Built on first use and read-only afterwards.
pub fn catalog() -> &'static HashMap<&'static str, Blueprint> {
    CATALOG.get_or_init(|| FORMS.iter().map(|form| (form.name, build(form))).collect())
}
