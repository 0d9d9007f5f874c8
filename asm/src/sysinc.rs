use arch::memmap::{BPM, DATA1, DATA2, PPQN, SEND, STATUS};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Sources reachable as `#include <name>`.
pub static SYSTEM_INCLUDES: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    let mut includes = IndexMap::new();
    includes.insert("midi".to_string(), midi());
    includes
});

fn midi() -> String {
    format!(
        "\
// I/O cells polled by the driver
#define MIDI_BPM {BPM:#06x}
#define MIDI_PPQN {PPQN:#06x}
#define MIDI_STATUS {STATUS:#06x}
#define MIDI_DATA1 {DATA1:#06x}
#define MIDI_DATA2 {DATA2:#06x}
#define MIDI_SEND {SEND:#06x}

// args: (status, data1, data2)
midi_send_message:
    load +7(fp), A
    store A, MIDI_STATUS
    load +8(fp), A
    store A, MIDI_DATA1
    load +9(fp), A
    store A, MIDI_DATA2
    mov A, 1
    store A, MIDI_SEND
    ret

// args: (note)
midi_trig:
    push 0x7f       ; velocity
    push +7(fp)     ; note
    push 0x90       ; note on
    push 3
    call midi_send_message
    push 0x40       ; release velocity
    push +7(fp)
    push 0x80       ; note off
    push 3
    call midi_send_message
    ret
"
    )
}
