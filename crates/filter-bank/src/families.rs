//! Built-in Orthogonal Families
//!
//! Scaling filters (low-pass analysis taps) of the families registered by
//! default. All remaining filters are derived by the quadrature-mirror
//! relation in [`crate::FilterQuad::orthogonal`].

use std::f64::consts::FRAC_1_SQRT_2;

const HAAR: [f64; 2] = [FRAC_1_SQRT_2, FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    0.482_962_913_144_534_1,
    0.836_516_303_737_807_9,
    0.224_143_868_042_013_4,
    -0.129_409_522_551_260_4,
];

const DB3: [f64; 6] = [
    0.332_670_552_950_082_6,
    0.806_891_509_311_092_5,
    0.459_877_502_118_491_5,
    -0.135_011_020_010_254_6,
    -0.085_441_273_882_026_7,
    0.035_226_291_885_709_5,
];

const DB4: [f64; 8] = [
    0.230_377_813_308_896_5,
    0.714_846_570_552_915_6,
    0.630_880_767_929_858_9,
    -0.027_983_769_416_859_9,
    -0.187_034_811_719_093_0,
    0.030_841_381_835_560_7,
    0.032_883_011_666_885_2,
    -0.010_597_401_785_069_0,
];

const DB6: [f64; 12] = [
    0.111_540_743_350_109_5,
    0.494_623_890_398_453_3,
    0.751_133_908_021_095_9,
    0.315_250_351_709_198_2,
    -0.226_264_693_965_440_0,
    -0.129_766_867_567_262_5,
    0.097_501_605_587_322_5,
    0.027_522_865_530_305_3,
    -0.031_582_039_317_486_2,
    0.000_553_842_201_161_4,
    0.004_777_257_510_945_5,
    -0.001_077_301_085_308_5,
];

const DB8: [f64; 16] = [
    0.054_415_842_243_104_9,
    0.312_871_590_914_303_1,
    0.675_630_736_297_290_4,
    0.585_354_683_654_190_7,
    -0.015_829_105_256_381_6,
    -0.284_015_542_961_570_2,
    0.000_472_484_573_912_4,
    0.128_747_426_620_483_7,
    -0.017_369_301_001_808_3,
    -0.044_088_253_930_795_2,
    0.013_981_027_917_399_5,
    0.008_746_094_047_406_1,
    -0.004_870_352_993_451_8,
    -0.000_391_740_373_377_0,
    0.000_675_449_406_450_6,
    -0.000_117_476_784_124_8,
];

const SYM4: [f64; 8] = [
    -0.075_765_714_789_273_33,
    -0.029_635_527_645_998_51,
    0.497_618_667_632_015_45,
    0.803_738_751_805_916_1,
    0.297_857_795_605_277_36,
    -0.099_219_543_576_847_22,
    -0.012_603_967_262_037_833,
    0.032_223_100_604_042_702,
];

const SYM8: [f64; 16] = [
    -0.003_382_415_951_359_4,
    -0.000_542_132_331_635_5,
    0.031_695_087_810_345_2,
    0.007_607_487_325_284_8,
    -0.143_294_238_351_054_2,
    -0.061_273_359_067_908_8,
    0.481_359_651_259_201_2,
    0.777_185_751_699_747_8,
    0.364_441_894_835_956_4,
    -0.051_945_838_107_875_1,
    -0.027_219_029_916_813_7,
    0.049_137_179_673_476_8,
    0.003_808_752_014_060_1,
    -0.014_952_258_336_792_6,
    -0.000_302_920_514_551_6,
    0.001_889_950_332_900_7,
];

const COIF1: [f64; 6] = [
    -0.015_655_728_135_464_54,
    -0.072_732_619_512_853_9,
    0.384_864_846_864_202_86,
    0.852_572_020_212_255_4,
    0.337_897_662_457_809_2,
    -0.072_732_619_512_853_9,
];

/// Family names with their scaling filters
pub(crate) const BUILTIN_FAMILIES: &[(&str, &[f64])] = &[
    ("haar", &HAAR),
    ("db2", &DB2),
    ("db3", &DB3),
    ("db4", &DB4),
    ("db6", &DB6),
    ("db8", &DB8),
    ("sym4", &SYM4),
    ("sym8", &SYM8),
    ("coif1", &COIF1),
];

/// Alternative names resolving to an already registered family
pub(crate) const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("db1", "haar"),
    ("sym2", "db2"),
    ("sym3", "db3"),
];
