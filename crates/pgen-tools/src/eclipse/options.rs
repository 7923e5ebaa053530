//! GNU MCU Eclipse option identifiers derived from compiler flags
//!
//! The plugin stores well-known compiler switches as enumerated or boolean
//! options of its tool chain. Flags that map onto such an option are
//! consumed; everything else ends up in the per-tool "other flags" fields.

use std::collections::BTreeSet;

use pgen_meta::{ExportDictionary, Stage};

const MFPU_IDS: &[(&str, &str)] = &[
    ("-mfpu=crypto-neon-fp-armv8", "cryptoneonfparmv8"),
    ("-mfpu=fpa", "fpa"),
    ("-mfpu=fpe2", "fpe2"),
    ("-mfpu=fpe3", "fpe3"),
    ("-mfpu=fp-armv8", "fparmv8"),
    ("-mfpu=fpv4-sp-d16", "fpv4spd16"),
    ("-mfpu=fpv5-d16", "fpv5d16"),
    ("-mfpu=fpv5-sp-d16", "fpv5spd16"),
    ("-mfpu=maverick", "maverick"),
    ("-mfpu=neon", "neon"),
    ("-mfpu=neon-fp16", "neonfp16"),
    ("-mfpu=neon-fp-armv8", "neonfparmv8"),
    ("-mfpu=neon-vfpv4", "neonvfpv4"),
    ("-mfpu=vfp", "vfp"),
    ("-mfpu=vfpv3", "vfpv3"),
    ("-mfpu=vfpv3-d16", "vfpv3d16"),
    ("-mfpu=vfpv3-d16-fp16", "vfpv3d16fp16"),
    ("-mfpu=vfpv3-fp16", "vfpv3fp16"),
    ("-mfpu=vfpv3xd", "vfpv3xd"),
    ("-mfpu=vfpv3xd-fp16", "vfpv3xdfp16"),
    ("-mfpu=vfpv4", "vfpv4"),
    ("-mfpu=vfpv4-d16", "vfpv4d16"),
];

const FPU_ABI_IDS: &[(&str, &str)] = &[
    ("-mfloat-abi=soft", "soft"),
    ("-mfloat-abi=softfp", "softfp"),
    ("-mfloat-abi=hard", "hard"),
];

const MCPU_IDS: &[(&str, &str)] = &[
    ("-mcpu=arm1020e", "arm1020e"),
    ("-mcpu=arm1020t", "arm1020t"),
    ("-mcpu=arm1022e", "arm1022e"),
    ("-mcpu=arm1026ej-s", "arm1026ej-s"),
    ("-mcpu=arm10e", "arm10e"),
    ("-mcpu=arm10tdmi", "arm10tdmi"),
    ("-mcpu=arm1136j-s", "arm1136j-s"),
    ("-mcpu=arm1136jf-s", "arm1136jf-s"),
    ("-mcpu=arm1156t2-s", "arm1156t2-s"),
    ("-mcpu=arm1156t2f-s", "arm1156t2f-s"),
    ("-mcpu=arm1176jz-s", "arm1176jz-s"),
    ("-mcpu=arm1176jzf-s", "arm1176jzf-s"),
    ("-mcpu=arm2", "arm2"),
    ("-mcpu=arm250", "arm250"),
    ("-mcpu=arm3", "arm3"),
    ("-mcpu=arm6", "arm6"),
    ("-mcpu=arm60", "arm60"),
    ("-mcpu=arm600", "arm600"),
    ("-mcpu=arm610", "arm610"),
    ("-mcpu=arm620", "arm620"),
    ("-mcpu=arm7", "arm7"),
    ("-mcpu=arm70", "arm70"),
    ("-mcpu=arm700", "arm700"),
    ("-mcpu=arm700i", "arm700i"),
    ("-mcpu=arm710", "arm710"),
    ("-mcpu=arm7100", "arm7100"),
    ("-mcpu=arm710c", "arm710c"),
    ("-mcpu=arm710t", "arm710t"),
    ("-mcpu=arm720", "arm720"),
    ("-mcpu=arm720t", "arm720t"),
    ("-mcpu=arm740t", "arm740t"),
    ("-mcpu=arm7500", "arm7500"),
    ("-mcpu=arm7500fe", "arm7500fe"),
    ("-mcpu=arm7d", "arm7d"),
    ("-mcpu=arm7di", "arm7di"),
    ("-mcpu=arm7dm", "arm7dm"),
    ("-mcpu=arm7dmi", "arm7dmi"),
    ("-mcpu=arm7m", "arm7m"),
    ("-mcpu=arm7tdmi", "arm7tdmi"),
    ("-mcpu=arm7tdmi-s", "arm7tdmi-s"),
    ("-mcpu=arm8", "arm8"),
    ("-mcpu=arm810", "arm810"),
    ("-mcpu=arm9", "arm9"),
    ("-mcpu=arm920", "arm920"),
    ("-mcpu=arm920t", "arm920t"),
    ("-mcpu=arm922t", "arm922t"),
    ("-mcpu=arm926ej-s", "arm926ej-s"),
    ("-mcpu=arm940t", "arm940t"),
    ("-mcpu=arm946e-s", "arm946e-s"),
    ("-mcpu=arm966e-s", "arm966e-s"),
    ("-mcpu=arm968e-s", "arm968e-s"),
    ("-mcpu=arm9e", "arm9e"),
    ("-mcpu=arm9tdmi", "arm9tdmi"),
    ("-mcpu=cortex-a12", "cortex-a12"),
    ("-mcpu=cortex-a15", "cortex-a15"),
    ("-mcpu=cortex-a17", "cortex-a17"),
    ("-mcpu=cortex-a32", "cortex-a32"),
    ("-mcpu=cortex-a35", "cortex-a35"),
    ("-mcpu=cortex-a5", "cortex-a5"),
    ("-mcpu=cortex-a53", "cortex-a53"),
    ("-mcpu=cortex-a57", "cortex-a57"),
    ("-mcpu=cortex-a7", "cortex-a7"),
    ("-mcpu=cortex-a72", "cortex-a72"),
    ("-mcpu=cortex-a8", "cortex-a8"),
    ("-mcpu=cortex-a9", "cortex-a9"),
    ("-mcpu=cortex-m0", "cortex-m0"),
    ("-mcpu=cortex-m0.small-multiply", "cortex-m0-small-multiply"),
    ("-mcpu=cortex-m0plus", "cortex-m0plus"),
    ("-mcpu=cortex-m0plus.small-multiply", "cortex-m0plus-small-multiply"),
    ("-mcpu=cortex-m1", "cortex-m1"),
    ("-mcpu=cortex-m1.small-multiply", "cortex-m1-small-multiply"),
    ("-mcpu=cortex-m23", "cortex-m23"),
    ("-mcpu=cortex-m3", "cortex-m3"),
    ("-mcpu=cortex-m33", "cortex-m33"),
    ("-mcpu=cortex-m4", "cortex-m4"),
    ("-mcpu=cortex-m7", "cortex-m7"),
    ("-mcpu=cortex-r4", "cortex-r4"),
    ("-mcpu=cortex-r4f", "cortex-r4f"),
    ("-mcpu=cortex-r5", "cortex-r5"),
    ("-mcpu=cortex-r7", "cortex-r7"),
    ("-mcpu=cortex-r8", "cortex-r8"),
    ("-mcpu=ep9312", "ep9312"),
    ("-mcpu=exynos-m1", "exynos-m1"),
    ("-mcpu=fa526", "fa526"),
    ("-mcpu=fa606te", "fa606te"),
    ("-mcpu=fa626", "fa626"),
    ("-mcpu=fa626te", "fa626te"),
    ("-mcpu=fa726te", "fa726te"),
    ("-mcpu=fmp626", "fmp626"),
    ("-mcpu=generic-armv7-a", "generic-armv7-a"),
    ("-mcpu=iwmmxt", "iwmmxt"),
    ("-mcpu=iwmmxt2", "iwmmxt2"),
];

const OPTIMIZATION_IDS: &[(&str, &str)] = &[
    ("-O0", "none"),
    ("-O1", "optimize"),
    ("-O2", "more"),
    ("-O3", "most"),
    ("-Os", "size"),
    ("-Og", "debug"),
];

const DEBUG_IDS: &[(&str, &str)] = &[("-g1", "minimal"), ("-g", "default"), ("-g3", "max")];

const INSTRUCTION_SET_IDS: &[(&str, &str)] = &[("-mthumb", "thumb"), ("-marm", "arm")];

const UNALIGNED_ACCESS_IDS: &[(&str, &str)] = &[
    ("-munaligned-access", "enabled"),
    ("-mno-unaligned-access", "disabled"),
];

const DEFAULT_MCPU: &str = "cortex-m3";
const DEFAULT_OPTIMIZATION: &str = "more";

/// Boolean switches and the option each one sets.
pub const BOOL_OPTIONS: &[(&str, &str)] = &[
    ("-Wall", "warnings.allwarn"),
    ("-Wextra", "warnings.extrawarn"),
    ("-fsyntax-only", "warnings.syntaxonly"),
    ("-pedantic", "warnings.pedantic"),
    ("-pedantic-errors", "warnings.pedanticerrors"),
    ("-w", "warnings.nowarn"),
    ("-Wunused", "warnings.unused"),
    ("-Wuninitialized", "warnings.uninitialized"),
    ("-Wmissing-declarations", "warnings.missingdeclaration"),
    ("-Wconversion", "warnings.conversion"),
    ("-Wpointer-arith", "warnings.pointerarith"),
    ("-Wshadow", "warnings.shadow"),
    ("-Wpadded", "warnings.padded"),
    ("-Werror", "warnings.toerrors"),
    ("-Wlogical-op", "warnings.logicalop"),
    ("-Waggregate-return", "warnings.agreggatereturn"),
    ("-Wfloat-equal", "warnings.floatequal"),
    ("-p", "debugging.prof"),
    ("-pg", "debugging.gprof"),
    ("-fmessage-length=0", "optimization.messagelength"),
    ("-fsigned-char", "optimization.signedchar"),
    ("-ffunction-sections", "optimization.functionsections"),
    ("-fdata-sections", "optimization.datasections"),
    ("-fno-common", "optimization.nocommon"),
    ("-ffreestanding", "optimization.freestanding"),
    ("-fno-move-loop-invariants", "optimization.nomoveloopinvariants"),
    ("-fno-inline-functions", "optimization.noinlinefunctions"),
    ("-fno-builtin", "optimization.nobuiltin"),
    ("-fsingle-precision-constant", "optimization.spconstant"),
    ("-fPIC", "optimization.PIC"),
    ("-flto", "optimization.lto"),
    ("-nostdinc", "c.compiler.nostdinc"),
    ("-nostdinc++", "cpp.compiler.nostdincpp"),
    ("-Wabi", "cpp.compiler.warnabi"),
    ("-fno-exceptions", "cpp.compiler.noexceptions"),
    ("-fno-rtti", "cpp.compiler.nortti"),
    ("-fno-use-cxa-atexit", "cpp.compiler.nousecxaatexit"),
    ("-fno-threadsafe-statics", "cpp.compiler.nothreadsafestatics"),
    ("-Wctor-dtor-privacy", "cpp.compiler.warning.ctordtorprivacy"),
    ("-Wnoexcept", "cpp.compiler.warning.noexcept"),
    ("-Wnon-virtual-dtor", "cpp.compiler.warning.nonvirtualdtor"),
    ("-Wstrict-null-sentinel", "cpp.compiler.warning.strictnullsentinel"),
    ("-Wsign-promo", "cpp.compiler.warning.signpromo"),
    ("-Weffc++", "cpp.compiler.warneffc"),
];

/// Linker switch enabling section garbage collection, compared without spaces.
const GC_SECTIONS: &str = "-Xlinker--gc-sections";

fn lookup(table: &[(&str, &'static str)], flag: &str) -> Option<&'static str> {
    table.iter().find(|(f, _)| *f == flag).map(|(_, id)| *id)
}

/// `-mcpu=` value; unknown CPUs fall back to `cortex-m3`.
pub fn mcpu_id(flag: &str) -> &'static str {
    lookup(MCPU_IDS, &flag.trim().to_lowercase()).unwrap_or(DEFAULT_MCPU)
}

/// `-mfpu=` value; unknown units fall back to `default`.
pub fn fpu_id(flag: &str) -> &'static str {
    lookup(MFPU_IDS, &flag.trim().to_lowercase()).unwrap_or("default")
}

pub fn fpu_abi_id(flag: &str) -> &'static str {
    lookup(FPU_ABI_IDS, &flag.trim().to_lowercase()).unwrap_or("default")
}

/// `-O` level; case-sensitive since `-Os` and `-O` differ. Falls back to `more`.
pub fn optimization_id(flag: &str) -> &'static str {
    lookup(OPTIMIZATION_IDS, flag.trim()).unwrap_or(DEFAULT_OPTIMIZATION)
}

/// `-g` level; anything unrecognised disables debug info.
pub fn debug_id(flag: &str) -> &'static str {
    lookup(DEBUG_IDS, &flag.trim().to_lowercase()).unwrap_or("none")
}

pub fn instruction_set_id(flag: &str) -> &'static str {
    lookup(INSTRUCTION_SET_IDS, &flag.trim().to_lowercase()).unwrap_or("default")
}

pub fn unaligned_access_id(flag: &str) -> &'static str {
    lookup(UNALIGNED_ACCESS_IDS, &flag.trim().to_lowercase()).unwrap_or("default")
}

/// Option values for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EclipseOptions {
    pub optimization: &'static str,
    pub debug: &'static str,
    pub mcu: &'static str,
    pub instruction_set: &'static str,
    pub fpu_abi: &'static str,
    pub fpu: &'static str,
    pub unaligned_access: &'static str,
    /// Option suffixes of [`BOOL_OPTIONS`] switched on.
    pub enabled: BTreeSet<&'static str>,
    pub gc_sections: bool,
    pub other_c_flags: Vec<String>,
    pub other_cxx_flags: Vec<String>,
    pub other_asm_flags: Vec<String>,
    pub other_ld_flags: Vec<String>,
}

impl Default for EclipseOptions {
    fn default() -> Self {
        Self {
            optimization: DEFAULT_OPTIMIZATION,
            debug: "none",
            mcu: DEFAULT_MCPU,
            instruction_set: "default",
            fpu_abi: "default",
            fpu: "default",
            unaligned_access: "default",
            enabled: BTreeSet::new(),
            gc_sections: false,
            other_c_flags: Vec::new(),
            other_cxx_flags: Vec::new(),
            other_asm_flags: Vec::new(),
            other_ld_flags: Vec::new(),
        }
    }
}

/// Where a flag came from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FlagSource {
    Stage(Stage),
    Linker,
}

impl EclipseOptions {
    /// Consume the export's flags: common, linker, C, C++ then assembler.
    pub fn from_export(export: &ExportDictionary) -> Self {
        let mut options = Self::default();
        let sources = [
            (FlagSource::Stage(Stage::Common), export.flags.common.as_slice()),
            (FlagSource::Linker, export.linker.flags.as_slice()),
            (FlagSource::Stage(Stage::C), export.flags.c.as_slice()),
            (FlagSource::Stage(Stage::Cxx), export.flags.cxx.as_slice()),
            (FlagSource::Stage(Stage::Asm), export.flags.asm.as_slice()),
        ];
        for (source, flags) in sources {
            for flag in flags {
                options.consume(source, flag);
            }
        }
        options
    }

    fn consume(&mut self, source: FlagSource, flag: &str) {
        if flag.starts_with("-O") {
            self.optimization = optimization_id(flag);
        } else if flag.starts_with("-g") {
            self.debug = debug_id(flag);
        } else if flag.starts_with("-mcpu=") {
            self.mcu = mcpu_id(flag);
        } else if flag == "-mthumb" || flag == "-marm" {
            self.instruction_set = instruction_set_id(flag);
        } else if flag.starts_with("-mfloat-abi=") {
            self.fpu_abi = fpu_abi_id(flag);
        } else if flag.starts_with("-mfpu=") {
            self.fpu = fpu_id(flag);
        } else if flag == "-munaligned-access" || flag == "-mno-unaligned-access" {
            self.unaligned_access = unaligned_access_id(flag);
        } else if let Some(option) = lookup(BOOL_OPTIONS, flag) {
            self.enabled.insert(option);
        } else if flag.replace(' ', "") == GC_SECTIONS {
            self.gc_sections = true;
        } else {
            let flag = flag.to_string();
            match source {
                FlagSource::Stage(Stage::Common) => {
                    self.other_c_flags.push(flag.clone());
                    self.other_cxx_flags.push(flag.clone());
                    self.other_asm_flags.push(flag);
                }
                FlagSource::Stage(Stage::C) => self.other_c_flags.push(flag),
                FlagSource::Stage(Stage::Cxx) => self.other_cxx_flags.push(flag),
                FlagSource::Stage(Stage::Asm) => self.other_asm_flags.push(flag),
                FlagSource::Linker => self.other_ld_flags.push(flag),
            }
        }
    }

    pub fn is_enabled(&self, option: &str) -> bool {
        self.enabled.contains(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("-mcpu=cortex-m4", "cortex-m4")]
    #[case("-mcpu=CORTEX-M0PLUS", "cortex-m0plus")]
    #[case("-mcpu=cortex-m0.small-multiply", "cortex-m0-small-multiply")]
    #[case("-mcpu=unknown", "cortex-m3")]
    fn mcpu_lookup(#[case] flag: &str, #[case] expected: &str) {
        assert_eq!(mcpu_id(flag), expected);
    }

    #[rstest]
    #[case("-Os", "size")]
    #[case("-O3", "most")]
    #[case("-Ofast", "more")]
    fn optimization_lookup(#[case] flag: &str, #[case] expected: &str) {
        assert_eq!(optimization_id(flag), expected);
    }

    #[test]
    fn fallbacks_for_unknown_flags() {
        assert_eq!(fpu_id("-mfpu=bogus"), "default");
        assert_eq!(fpu_abi_id(""), "default");
        assert_eq!(debug_id("-g2"), "none");
        assert_eq!(debug_id("-g"), "default");
        assert_eq!(unaligned_access_id("-mno-unaligned-access"), "disabled");
    }

    #[test]
    fn flags_are_consumed_or_forwarded() {
        let mut export = ExportDictionary::default();
        export.flags.common = vec![
            "-mcpu=cortex-m4".into(),
            "-mthumb".into(),
            "-Wall".into(),
            "-fstack-usage".into(),
        ];
        export.flags.cxx = vec!["-std=gnu++11".into(), "-fno-rtti".into()];
        export.linker.flags = vec!["-Xlinker --gc-sections".into(), "--specs=nano.specs".into()];

        let options = EclipseOptions::from_export(&export);

        assert_eq!(options.mcu, "cortex-m4");
        assert_eq!(options.instruction_set, "thumb");
        assert!(options.is_enabled("warnings.allwarn"));
        assert!(options.is_enabled("cpp.compiler.nortti"));
        assert!(options.gc_sections);
        assert_eq!(options.other_c_flags, vec!["-fstack-usage"]);
        assert_eq!(options.other_cxx_flags, vec!["-fstack-usage", "-std=gnu++11"]);
        assert_eq!(options.other_asm_flags, vec!["-fstack-usage"]);
        assert_eq!(options.other_ld_flags, vec!["--specs=nano.specs"]);
    }
}
