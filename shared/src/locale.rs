//! Localization helpers (Arabic / English)
//!
//! The UI is bilingual; every user-facing message resolves through [`Lang`].
//! Backend error text follows the "prefer Arabic script" heuristic: the
//! remote store speaks Arabic to end users, so any Arabic-script message it
//! returns is surfaced verbatim, and everything else collapses to a generic
//! localized fallback.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// العربية
    #[default]
    Ar,
    /// English
    En,
}

/// Bilingual display text (اسم ثنائي اللغة)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    pub ar: String,
    pub en: String,
}

impl LocalizedText {
    /// Build from both language variants
    pub fn new(ar: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ar: ar.into(),
            en: en.into(),
        }
    }

    /// Resolve for a language, falling back to the other variant when empty
    pub fn get(&self, lang: Lang) -> &str {
        let (primary, fallback) = match lang {
            Lang::Ar => (&self.ar, &self.en),
            Lang::En => (&self.en, &self.ar),
        };
        if primary.is_empty() { fallback } else { primary }
    }
}

/// True if the string contains at least one Arabic-script character
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
    })
}

/// Surface a raw backend error message to the user.
///
/// Arabic-script text is assumed to be written for end users and passes
/// through verbatim; anything else (stack traces, English internals) is
/// replaced by the generic localized fallback.
pub fn surface_remote_message(raw: &str, lang: Lang) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && contains_arabic(trimmed) {
        trimmed.to_string()
    } else {
        localized(ErrorCode::RemoteRejected, lang).to_string()
    }
}

/// Localized user-facing message for an error code
pub fn localized(code: ErrorCode, lang: Lang) -> &'static str {
    match lang {
        Lang::En => code.message(),
        Lang::Ar => message_ar(code),
    }
}

/// Arabic variants for codes that surface in the UI.
/// Codes without a dedicated translation fall back to the generic message.
fn message_ar(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Success => "تمت العملية بنجاح",
        ErrorCode::ValidationFailed => "فشل التحقق من البيانات",
        ErrorCode::NotFound => "العنصر غير موجود",

        // Checkout form
        ErrorCode::NameInvalid => "الاسم يجب أن يكون بين 3 و 50 حرفاً وبأحرف عربية أو لاتينية فقط",
        ErrorCode::PhoneInvalid => "رقم الهاتف يجب أن يبدأ بـ 77 أو 73 أو 71 أو 70 متبوعاً بسبعة أرقام",
        ErrorCode::AddressInvalid => "العنوان يجب أن يكون بين 10 و 200 حرف",
        ErrorCode::ScheduleInPast => "وقت التوصيل المجدول يجب أن يكون في المستقبل",

        // Permission
        ErrorCode::PermissionDenied => "ليس لديك صلاحية لهذه العملية",

        // Checkout gates
        ErrorCode::CartEmpty => "السلة فارغة",
        ErrorCode::ZoneNotSelected => "يرجى اختيار منطقة التوصيل",
        ErrorCode::ZoneInactive => "منطقة التوصيل المختارة غير متاحة حالياً",
        ErrorCode::LocationMissing => "يرجى تحديد موقعك على الخريطة قبل إتمام الطلب",
        ErrorCode::ZoneMismatch => "موقعك خارج نطاق منطقة التوصيل المختارة",
        ErrorCode::PaymentMethodUnavailable => "طريقة الدفع المختارة غير متاحة",
        ErrorCode::PaymentProofMissing => "يرجى إدخال رقم الحوالة أو إرفاق صورة الإيصال",
        ErrorCode::PaymentProofNotAllowed => "الدفع النقدي لا يحتاج إلى إثبات دفع",
        ErrorCode::PaymentTargetMissing => "لا يوجد حساب مستلم متاح لطريقة الدفع المختارة",

        // Order
        ErrorCode::OrderRejected => "تعذر إنشاء الطلب، يرجى المحاولة مرة أخرى",

        // Location
        ErrorCode::LocationPermissionDenied => "تم رفض إذن الوصول إلى الموقع",
        ErrorCode::LocationTimeout => "انتهت مهلة تحديد الموقع",
        ErrorCode::LocationUnavailable => "تعذر تحديد الموقع، يمكنك اختيار الموقع يدوياً من الخريطة",

        // Ledger / settlement workspace
        ErrorCode::OpenItemPairRequired => "يرجى اختيار قيد مدين وقيد دائن",
        ErrorCode::CurrencyMismatch => "لا يمكن التسوية بين قيود بعملات مختلفة",
        ErrorCode::AmountNotPositive => "مبلغ التسوية يجب أن يكون أكبر من صفر",
        ErrorCode::AmountExceedsOpen => "مبلغ التسوية يتجاوز الرصيد المتبقي",
        ErrorCode::SettlementEmpty => "لا توجد تخصيصات للتسوية",
        ErrorCode::SettlementRejected => "تعذر إنشاء التسوية",
        ErrorCode::ReasonRequired => "يرجى إدخال سبب الإلغاء",

        // System
        ErrorCode::RemoteRejected => "حدث خطأ في الخادم، يرجى المحاولة لاحقاً",
        ErrorCode::NetworkError => "تعذر الاتصال بالخادم",
        ErrorCode::TimeoutError => "انتهت مهلة الطلب، يرجى المحاولة مرة أخرى",
        ErrorCode::DecodeError => "استجابة غير صالحة من الخادم",

        _ => "حدث خطأ غير متوقع",
    }
}
