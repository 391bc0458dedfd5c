use serde::{Deserialize, Serialize};
use std::fmt;

/// How an answer to a question is turned into adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Functionality check answered `yes` or `no`.
    YesNo,
    /// Exactly one condition label applies.
    SingleSelect,
    /// Every selected label adds its own delta.
    MultiSelect,
    /// Multi-select where `noIssues` suppresses its siblings.
    FunctionalIssues,
}

/// Sentinel option that overrides every other functional issue.
pub const NO_ISSUES: &str = "noIssues";

const YES_NO: &[&str] = &["yes", "no"];

macro_rules! questions {
    ($($variant:ident => $key:literal, $kind:ident, $options:expr;)+) => {
        /// Every assessment question the calculator knows how to price.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Question {
            $($variant,)+
        }

        impl Question {
            pub const ALL: &'static [Question] = &[$(Question::$variant,)+];

            /// Wire key used by the assessment UI and the stored rules documents.
            pub const fn key(self) -> &'static str {
                match self {
                    $(Question::$variant => $key,)+
                }
            }

            pub const fn kind(self) -> QuestionKind {
                match self {
                    $(Question::$variant => QuestionKind::$kind,)+
                }
            }

            /// Option labels the admin UI offers for this question.
            pub fn options(self) -> &'static [&'static str] {
                match self {
                    $(Question::$variant => $options,)+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(Question::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

questions! {
    // camera
    PowerOn => "powerOn", YesNo, YES_NO;
    WaterDamage => "waterDamage", YesNo, YES_NO;
    FlashWorking => "flashWorking", YesNo, YES_NO;
    ButtonsWorking => "buttonsWorking", YesNo, YES_NO;
    MemoryCardSlotWorking => "memoryCardSlotWorking", YesNo, YES_NO;
    ViewfinderWorking => "viewfinderWorking", YesNo, YES_NO;
    BatteryCompartmentOk => "batteryCompartmentOk", YesNo, YES_NO;
    // phone
    ScreenTouchWorking => "screenTouchWorking", YesNo, YES_NO;
    CallFunctionWorking => "callFunctionWorking", YesNo, YES_NO;
    FaceIdWorking => "faceIdWorking", YesNo, YES_NO;
    FingerprintWorking => "fingerprintWorking", YesNo, YES_NO;
    WifiBluetoothWorking => "wifiBluetoothWorking", YesNo, YES_NO;
    ChargingPortWorking => "chargingPortWorking", YesNo, YES_NO;
    SpeakerWorking => "speakerWorking", YesNo, YES_NO;
    MicrophoneWorking => "microphoneWorking", YesNo, YES_NO;
    FrontCameraWorking => "frontCameraWorking", YesNo, YES_NO;
    BackCameraWorking => "backCameraWorking", YesNo, YES_NO;
    // laptop
    KeyboardWorking => "keyboardWorking", YesNo, YES_NO;
    TouchpadWorking => "touchpadWorking", YesNo, YES_NO;
    HingeOk => "hingeOk", YesNo, YES_NO;
    PortsWorking => "portsWorking", YesNo, YES_NO;
    // tablet
    SimSlotWorking => "simSlotWorking", YesNo, YES_NO;
    StylusWorking => "stylusWorking", YesNo, YES_NO;
    // samsung
    SPenWorking => "sPenWorking", YesNo, YES_NO;
    SamsungAccountRemoved => "samsungAccountRemoved", YesNo, YES_NO;
    // paperwork
    HasOriginalBill => "hasOriginalBill", YesNo, YES_NO;
    UnderWarranty => "underWarranty", YesNo, YES_NO;

    LensCondition => "lensCondition", SingleSelect,
        &["good", "scratches", "fungus", "dust", "haze", "broken"];
    ErrorCondition => "errorCondition", SingleSelect,
        &["noError", "lensError", "sensorError", "shutterError", "memoryError"];
    BatteryHealth => "batteryHealth", SingleSelect,
        &["above90", "80to90", "70to80", "below70", "serviceRequired"];
    CameraCondition => "cameraCondition", SingleSelect,
        &["excellent", "good", "fair", "poor"];
    LcdScreenCondition => "lcdScreenCondition", SingleSelect,
        &["flawless", "minorScratches", "majorScratches", "cracked", "deadPixels"];
    ShutterCount => "shutterCount", SingleSelect,
        &["below10k", "10kTo50k", "50kTo100k", "above100k"];
    BodyPhysicalCondition => "bodyPhysicalCondition", SingleSelect,
        &["likeNew", "minorWear", "heavyWear", "dented", "cracked"];
    Age => "age", SingleSelect,
        &["lessThanThreeMonths", "fourToTwelveMonths", "oneToTwoYears", "aboveTwoYears"];

    DisplayCondition => "displayCondition", MultiSelect,
        &["good", "minorScratches", "majorScratches", "cracked", "spots", "lines", "discoloration"];
    BodyCondition => "bodyCondition", MultiSelect,
        &["excellent", "good", "fair", "poor", "dents", "scratches", "cracks", "bent"];
    FungusDustCondition => "fungusDustCondition", MultiSelect,
        &["clean", "lightDust", "heavyDust", "lightFungus", "heavyFungus"];
    FocusFunctionality => "focusFunctionality", MultiSelect,
        &["autoFocusWorking", "autoFocusIssue", "manualFocusWorking", "manualFocusIssue"];
    RubberRingCondition => "rubberRingCondition", MultiSelect,
        &["good", "loose", "torn", "missing"];
    LensErrorStatus => "lensErrorStatus", MultiSelect,
        &["noError", "zoomError", "focusError", "apertureError"];
    Accessories => "accessories", MultiSelect,
        &["box", "charger", "battery", "cable", "lensCap", "strap", "bag", "manual", "bill", "earphones"];

    FunctionalIssues => "functionalIssues", FunctionalIssues,
        &[
            "noIssues",
            "speakerIssue",
            "microphoneIssue",
            "cameraIssue",
            "batteryIssue",
            "chargingIssue",
            "networkIssue",
            "buttonIssue",
            "overheating",
        ];
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Question {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Question::from_key(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown question '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_round_trip_through_from_key() {
        for question in Question::ALL {
            assert_eq!(Question::from_key(question.key()), Some(*question));
        }
        assert_eq!(Question::from_key("screenSize"), None);
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = Question::ALL.iter().map(|q| q.key()).collect();
        assert_eq!(keys.len(), Question::ALL.len());
    }

    #[test]
    fn yes_no_questions_cover_every_device_family() {
        let yes_no = Question::ALL
            .iter()
            .filter(|q| q.kind() == QuestionKind::YesNo)
            .count();
        assert!(yes_no >= 24, "expected roughly two dozen checks, got {yes_no}");
        assert_eq!(Question::SPenWorking.options(), &["yes", "no"]);
    }

    #[test]
    fn functional_issues_offer_the_sentinel() {
        assert_eq!(Question::FunctionalIssues.kind(), QuestionKind::FunctionalIssues);
        assert!(Question::FunctionalIssues.options().contains(&NO_ISSUES));
        assert_eq!(Question::Age.kind(), QuestionKind::SingleSelect);
    }
}
