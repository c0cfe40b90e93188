//! Canned, localized bot texts and the rule-based reply generator.

use crate::language::Language;

/// One text in each supported language.
#[derive(Clone, Copy, Debug)]
pub struct Localized {
    pub ar: &'static str,
    pub fr: &'static str,
    pub en: &'static str,
}

impl Localized {
    pub fn get(&self, lang: Language) -> &'static str {
        match lang {
            Language::Arabic => self.ar,
            Language::French => self.fr,
            Language::English => self.en,
        }
    }
}

pub const WELCOME: Localized = Localized {
    ar: "مرحباً! هذا بوت تنبيهات منحة البطالة. اكتب /minha للحصول على آخر الأخبار.",
    fr: "Bienvenue! Ceci est le bot d'alerte Minha. Tapez /minha pour les dernières infos.",
    en: "Welcome! This is the Minha alerts bot. Type /minha for latest updates.",
};

pub const SUBSCRIBED: Localized = Localized {
    ar: "تم تفعيل التنبيه: ستحصل على إشعار عند فتح التسجيل.",
    fr: "Abonnement activé: vous recevrez une alerte.",
    en: "Subscription activated: you'll receive alerts.",
};

pub const UNSUBSCRIBED: Localized = Localized {
    ar: "تم إلغاء الاشتراك. يمكنك إعادة الاشتراك بإرسال /minha",
    fr: "Désabonné. Vous pouvez vous réabonner avec /minha",
    en: "Unsubscribed. You can subscribe again with /minha",
};

pub const HELP: Localized = Localized {
    ar: "/minha - تفعيل التنبيه\n/stop - إلغاء الاشتراك\n/help - المساعدة",
    fr: "/minha - Activer l'alerte\n/stop - Se désabonner\n/help - Aide",
    en: "/minha - Activate alert\n/stop - Unsubscribe\n/help - Help",
};

const OPENING_TIME: Localized = Localized {
    ar: "الموقع لا يملك وقت ثابت، سنرسل لك إشعاراً أول ما يفتح.",
    fr: "Le site n'a pas d'horaire fixe. Nous vous enverrons une alerte dès qu'il ouvre.",
    en: "The site has no fixed opening time. You'll get notified when it opens.",
};

const DOCUMENTS: Localized = Localized {
    ar: "الوثائق المطلوبة عادة: بطاقة وطنية، شهادة الحالة،... (تحقق محلياً من الوكالة).",
    fr: "Documents typiques: carte d'identité, justificatif de situation, etc. Vérifiez localement.",
    en: "Typical docs: ID card, proof of status, etc. Check locally with ANEM.",
};

const FALLBACK: Localized = Localized {
    ar: "أستطيع تنبيهك عند فتح الموقع أو الإجابة عن أسئلة بسيطة حول المنحة. اكتب /minha للتسجيل في التنبيهات.",
    fr: "Je peux vous alerter quand le site ouvre ou répondre à des questions simples. Tapez /minha.",
    en: "I can alert you when the site opens or answer simple questions. Type /minha.",
};

const OPENING_TIME_KEYWORDS: &[&str] = &["متى", "وقت", "متى يفتح", "مفتوح"];
const DOCUMENTS_KEYWORDS: &[&str] = &["كيف", "واش لازم", "documents", "وثائق"];

/// Pick a canned answer for free text. Keyword groups are checked in order;
/// the first match wins, otherwise the generic fallback is used.
pub fn generate_reply(text: &str, lang: Language) -> &'static str {
    let t = text.to_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|k| t.contains(k));

    if matches_any(OPENING_TIME_KEYWORDS) {
        return OPENING_TIME.get(lang);
    }
    if matches_any(DOCUMENTS_KEYWORDS) {
        return DOCUMENTS.get(lang);
    }
    FALLBACK.get(lang)
}

/// Page-change alert. The broadcast currently always uses Arabic since no
/// per-subscriber language is stored.
pub fn alert_text(url: &str, lang: Language) -> String {
    match lang {
        Language::Arabic => {
            format!("تنبيه: تم تحديث صفحة التسجيل لمنحة البطالة. ادخل الآن: {url}")
        }
        Language::French => {
            format!("Alerte: la page de pré-inscription a été mise à jour. Vérifiez: {url}")
        }
        Language::English => format!("Alert: Minha pre-inscription page updated. Check: {url}"),
    }
}
